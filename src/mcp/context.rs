//! MCP Tool Execution Context
//!
//! Provides access to the broker handlers and configuration for tool
//! implementations.

use std::sync::Arc;

use crate::broker::BrokerHandlers;
use crate::config::BrokerConfig;

/// Context provided to tool handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Broker actions (AMQP connector + management API)
    pub handlers: BrokerHandlers,

    /// Immutable broker configuration
    pub config: Arc<BrokerConfig>,
}

impl ToolContext {
    pub fn new(handlers: BrokerHandlers, config: Arc<BrokerConfig>) -> Self {
        Self { handlers, config }
    }

    /// Vhost to use when the caller does not name one.
    pub fn default_vhost(&self) -> &str {
        &self.config.default_vhost
    }
}
