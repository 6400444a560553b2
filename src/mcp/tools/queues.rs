//! Queue Tools
//!
//! Listing, inspection, deletion and purging of queues through the
//! management API.

use serde::Deserialize;
use serde_json::Value;

use super::{json_result, parse_params, vhost_property};
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{
    McpRegistry, RegisteredTool, RegistryError, ToolBuilder, ToolCategory, ToolResult,
};

/// Register queue tools with the registry
pub fn register_tools(registry: &mut McpRegistry) -> Result<(), RegistryError> {
    registry.register_tool(list_queues_tool())?;
    registry.register_tool(get_queue_info_tool())?;
    registry.register_tool(delete_queue_tool())?;
    registry.register_tool(purge_queue_tool())?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct VhostParams {
    #[serde(default)]
    vhost: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueueParams {
    queue: String,
    #[serde(default)]
    vhost: Option<String>,
}

fn queue_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "queue": {
                "type": "string",
                "description": "The name of the queue"
            },
            "vhost": vhost_property()
        },
        "required": ["queue"]
    })
}

// ============================================================================
// list_queues
// ============================================================================

fn list_queues_tool() -> RegisteredTool {
    ToolBuilder::new("list_queues")
        .description("List all the queues in the broker")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "vhost": vhost_property()
            }
        }))
        .category(ToolCategory::Admin)
        .build(list_queues_handler)
}

async fn list_queues_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: VhostParams = parse_params(params)?;
    let vhost = params.vhost.as_deref().unwrap_or(ctx.default_vhost());
    let queues = ctx.handlers.list_queues(vhost).await?;
    json_result(&queues)
}

// ============================================================================
// get_queue_info
// ============================================================================

fn get_queue_info_tool() -> RegisteredTool {
    ToolBuilder::new("get_queue_info")
        .description("Get detailed information about a specific queue")
        .input_schema(queue_schema())
        .category(ToolCategory::Admin)
        .build(get_queue_info_handler)
}

async fn get_queue_info_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: QueueParams = parse_params(params)?;
    let vhost = params.vhost.as_deref().unwrap_or(ctx.default_vhost());
    let info = ctx.handlers.get_queue_info(&params.queue, vhost).await?;
    json_result(&info)
}

// ============================================================================
// delete_queue
// ============================================================================

fn delete_queue_tool() -> RegisteredTool {
    ToolBuilder::new("delete_queue")
        .description("Delete a specific queue")
        .input_schema(queue_schema())
        .category(ToolCategory::Admin)
        .build(delete_queue_handler)
}

async fn delete_queue_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: QueueParams = parse_params(params)?;
    let vhost = params.vhost.as_deref().unwrap_or(ctx.default_vhost());
    let confirmation = ctx.handlers.delete_queue(&params.queue, vhost).await?;
    Ok(ToolsCallResult::text(confirmation))
}

// ============================================================================
// purge_queue
// ============================================================================

fn purge_queue_tool() -> RegisteredTool {
    ToolBuilder::new("purge_queue")
        .description("Remove all messages from a specific queue")
        .input_schema(queue_schema())
        .category(ToolCategory::Admin)
        .build(purge_queue_handler)
}

async fn purge_queue_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: QueueParams = parse_params(params)?;
    let vhost = params.vhost.as_deref().unwrap_or(ctx.default_vhost());
    let confirmation = ctx.handlers.purge_queue(&params.queue, vhost).await?;
    Ok(ToolsCallResult::text(confirmation))
}
