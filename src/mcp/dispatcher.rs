//! Tool Dispatcher
//!
//! Routes a `tools/call` to its registered handler and applies the
//! propagation policy of the tool's category: publish tools report broker
//! failures as an `isError` result, admin tools hand them back typed.

use serde_json::Value;
use tracing::{debug, error};

use super::context::ToolContext;
use super::protocol::ToolsCallResult;
use super::registry::{McpRegistry, ToolCategory, ToolResult};
use super::tools::publish::failure_text;
use crate::error::ToolError;

/// Invokes the tool called `name` with `arguments`.
///
/// Validation and unknown-tool errors always come back as `Err`. Broker
/// failures come back as `Err` for admin tools and as an `isError` result
/// for publish tools. Every failure is logged before returning.
pub async fn dispatch(
    registry: &McpRegistry,
    ctx: ToolContext,
    name: &str,
    arguments: Value,
) -> ToolResult {
    debug!("Dispatching tool '{}' with arguments {}", name, arguments);

    let Some(tool) = registry.get_tool(name) else {
        let err = ToolError::UnknownTool(name.to_string());
        error!(kind = err.kind(), tool = name, "Tool call rejected: {}", err);
        return Err(err);
    };

    let err = match (tool.handler)(ctx, arguments.clone()).await {
        Ok(result) => return Ok(result),
        Err(err) => err,
    };

    error!(
        kind = err.kind(),
        tool = name,
        target = %target_of(&arguments),
        "Tool call failed: {}",
        err
    );

    if tool.category == ToolCategory::Publish && err.is_broker_failure() {
        return Ok(ToolsCallResult::error(failure_text(
            name,
            &arguments,
            &err.to_string(),
        )));
    }
    Err(err)
}

/// The broker entity a call was aimed at, for log lines.
fn target_of(arguments: &Value) -> &str {
    ["queue", "exchange", "vhost"]
        .iter()
        .find_map(|key| arguments.get(*key).and_then(Value::as_str))
        .unwrap_or("-")
}
