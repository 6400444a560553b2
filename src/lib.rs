//! RabbitMQ MCP Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod broker;
pub mod config;
pub mod error;
pub mod mcp;

// Re-export commonly used types for convenience
pub use broker::BrokerHandlers;
pub use config::{AppConfig, BrokerConfig};
pub use error::ToolError;
