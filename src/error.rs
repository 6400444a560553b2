//! Error taxonomy shared by the broker adapters, the tool handlers and the
//! dispatcher.

use thiserror::Error;

/// Errors produced while serving a single tool invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// Malformed or missing arguments, or an invalid broker object name.
    /// Always raised before any network access.
    #[error("{0}")]
    Validation(String),

    /// Broker unreachable, credentials rejected or TLS handshake failure.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An admin operation targeted an entity that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other broker-side rejection.
    #[error("Broker operation failed: {0}")]
    BrokerOperation(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ToolError::Validation(msg.into())
    }

    pub fn connection(err: impl std::fmt::Display) -> Self {
        ToolError::Connection(err.to_string())
    }

    pub fn broker(err: impl std::fmt::Display) -> Self {
        ToolError::BrokerOperation(err.to_string())
    }

    /// Stable label used in logs and in JSON-RPC error data.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "validation",
            ToolError::Connection(_) => "connection",
            ToolError::NotFound(_) => "not_found",
            ToolError::BrokerOperation(_) => "broker_operation",
            ToolError::UnknownTool(_) => "unknown_tool",
        }
    }

    /// True for failures reported by the broker or its transport, as opposed
    /// to request-level errors caught before any network access.
    pub fn is_broker_failure(&self) -> bool {
        matches!(
            self,
            ToolError::Connection(_) | ToolError::NotFound(_) | ToolError::BrokerOperation(_)
        )
    }
}
