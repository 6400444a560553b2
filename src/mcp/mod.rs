//! MCP (Model Context Protocol) Server
//!
//! Exposes the broker operations as MCP tools so an LLM host can publish
//! messages and administer queues and exchanges.
//!
//! ## Architecture
//!
//! - Transport: newline-delimited JSON-RPC over stdin/stdout
//! - Registry: built and checked for completeness once at startup
//! - Dispatch: per-category error policy (publish tools fold broker
//!   failures into an `isError` result, admin tools propagate them)

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod tools;

pub use context::ToolContext;
pub use dispatcher::dispatch;
pub use handler::{create_mcp_state, serve, serve_stdio, McpState};
pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::McpRegistry;
