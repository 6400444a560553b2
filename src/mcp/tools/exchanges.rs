//! Exchange Tools

use serde::Deserialize;
use serde_json::Value;

use super::{json_result, parse_params, vhost_property};
use crate::mcp::context::ToolContext;
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{
    McpRegistry, RegisteredTool, RegistryError, ToolBuilder, ToolCategory, ToolResult,
};

/// Register exchange tools with the registry
pub fn register_tools(registry: &mut McpRegistry) -> Result<(), RegistryError> {
    registry.register_tool(list_exchanges_tool())?;
    registry.register_tool(get_exchange_info_tool())?;
    registry.register_tool(delete_exchange_tool())?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct VhostParams {
    #[serde(default)]
    vhost: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeParams {
    exchange: String,
    #[serde(default)]
    vhost: Option<String>,
}

fn exchange_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "exchange": {
                "type": "string",
                "description": "The name of the exchange"
            },
            "vhost": vhost_property()
        },
        "required": ["exchange"]
    })
}

fn list_exchanges_tool() -> RegisteredTool {
    ToolBuilder::new("list_exchanges")
        .description("List all the exchanges in the broker")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "vhost": vhost_property()
            }
        }))
        .category(ToolCategory::Admin)
        .build(list_exchanges_handler)
}

async fn list_exchanges_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: VhostParams = parse_params(params)?;
    let vhost = params.vhost.as_deref().unwrap_or(ctx.default_vhost());
    let exchanges = ctx.handlers.list_exchanges(vhost).await?;
    json_result(&exchanges)
}

fn get_exchange_info_tool() -> RegisteredTool {
    ToolBuilder::new("get_exchange_info")
        .description("Get detailed information about a specific exchange")
        .input_schema(exchange_schema())
        .category(ToolCategory::Admin)
        .build(get_exchange_info_handler)
}

async fn get_exchange_info_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ExchangeParams = parse_params(params)?;
    let vhost = params.vhost.as_deref().unwrap_or(ctx.default_vhost());
    let info = ctx.handlers.get_exchange_info(&params.exchange, vhost).await?;
    json_result(&info)
}

fn delete_exchange_tool() -> RegisteredTool {
    ToolBuilder::new("delete_exchange")
        .description("Delete a specific exchange")
        .input_schema(exchange_schema())
        .category(ToolCategory::Admin)
        .build(delete_exchange_handler)
}

async fn delete_exchange_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ExchangeParams = parse_params(params)?;
    let vhost = params.vhost.as_deref().unwrap_or(ctx.default_vhost());
    let confirmation = ctx.handlers.delete_exchange(&params.exchange, vhost).await?;
    Ok(ToolsCallResult::text(confirmation))
}
