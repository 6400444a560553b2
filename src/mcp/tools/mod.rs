//! MCP Tools
//!
//! Tool descriptors and argument handling for publishing, queue and
//! exchange administration.

pub mod exchanges;
pub mod publish;
pub mod queues;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::protocol::ToolsCallResult;
use super::registry::{McpRegistry, RegistryError, ToolResult};
use crate::error::ToolError;

/// Every tool the server advertises. Registration must cover exactly this
/// set.
pub const TOOL_CATALOG: &[&str] = &[
    "enqueue",
    "fanout",
    "list_queues",
    "list_exchanges",
    "get_queue_info",
    "delete_queue",
    "purge_queue",
    "get_exchange_info",
    "delete_exchange",
];

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) -> Result<(), RegistryError> {
    publish::register_tools(registry)?;
    queues::register_tools(registry)?;
    exchanges::register_tools(registry)?;
    Ok(())
}

/// Builds the full registry and checks it against [`TOOL_CATALOG`].
pub fn build_registry() -> Result<McpRegistry, RegistryError> {
    let mut registry = McpRegistry::new();
    register_all_tools(&mut registry)?;
    registry.verify_complete(TOOL_CATALOG)?;
    Ok(registry)
}

/// Deserializes tool arguments. A missing argument object counts as `{}`.
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, ToolError> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        Value::Object(_) => params,
        other => {
            return Err(ToolError::validation(format!(
                "arguments must be an object, got {}",
                other
            )))
        }
    };
    serde_json::from_value(params).map_err(|e| ToolError::validation(e.to_string()))
}

/// Wraps a structured admin API payload as a JSON text result.
pub(crate) fn json_result<T: serde::Serialize>(value: &T) -> ToolResult {
    ToolsCallResult::json(value)
        .map_err(|e| ToolError::broker(format!("failed to encode response: {}", e)))
}

/// Schema fragment for the optional vhost argument shared by admin tools.
pub(crate) fn vhost_property() -> Value {
    serde_json::json!({
        "type": "string",
        "description": "The virtual host",
        "default": crate::config::DEFAULT_VHOST
    })
}
