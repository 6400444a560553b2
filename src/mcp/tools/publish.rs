//! Publish Tools
//!
//! `enqueue` (default exchange, routed by queue name) and `fanout`.

use serde::Deserialize;
use serde_json::Value;

use super::parse_params;
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{
    McpRegistry, RegisteredTool, RegistryError, ToolBuilder, ToolCategory, ToolResult,
};

/// Register publish tools with the registry
pub fn register_tools(registry: &mut McpRegistry) -> Result<(), RegistryError> {
    registry.register_tool(enqueue_tool())?;
    registry.register_tool(fanout_tool())?;
    Ok(())
}

// ============================================================================
// enqueue
// ============================================================================

#[derive(Debug, Deserialize)]
struct EnqueueParams {
    message: String,
    queue: String,
}

fn enqueue_tool() -> RegisteredTool {
    ToolBuilder::new("enqueue")
        .description("Enqueue a message to a queue hosted on RabbitMQ")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message to publish"
                },
                "queue": {
                    "type": "string",
                    "description": "The name of the queue"
                }
            },
            "required": ["message", "queue"]
        }))
        .category(ToolCategory::Publish)
        .build(enqueue_handler)
}

async fn enqueue_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: EnqueueParams = parse_params(params)?;
    let confirmation = ctx.handlers.enqueue(&params.queue, &params.message).await?;
    Ok(ToolsCallResult::text(confirmation))
}

// ============================================================================
// fanout
// ============================================================================

#[derive(Debug, Deserialize)]
struct FanoutParams {
    message: String,
    exchange: String,
}

fn fanout_tool() -> RegisteredTool {
    ToolBuilder::new("fanout")
        .description("Publish a message to an exchange with fanout type")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message to publish"
                },
                "exchange": {
                    "type": "string",
                    "description": "The name of the exchange"
                }
            },
            "required": ["message", "exchange"]
        }))
        .category(ToolCategory::Publish)
        .build(fanout_handler)
}

async fn fanout_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: FanoutParams = parse_params(params)?;
    let confirmation = ctx.handlers.fanout(&params.exchange, &params.message).await?;
    Ok(ToolsCallResult::text(confirmation))
}

/// Failure text reported to the host when a publish is folded into a
/// result instead of an error.
pub(crate) fn failure_text(tool: &str, arguments: &Value, error: &str) -> String {
    let target = |key: &str| {
        arguments
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string()
    };
    match tool {
        "enqueue" => format!(
            "Failed to enqueue message to queue '{}': {}",
            target("queue"),
            error
        ),
        "fanout" => format!(
            "Failed to publish message to exchange '{}': {}",
            target("exchange"),
            error
        ),
        _ => format!("Failed to publish message: {}", error),
    }
}
