//! JSON-RPC session harness
//!
//! Runs the real stdio session loop over in-memory streams, with the broker
//! seams replaced by the given fakes.

#![allow(dead_code)]

use super::constants::*;
use rabbitmq_mcp::broker::{AdminApi, BrokerConnector, BrokerHandlers};
use rabbitmq_mcp::config::{AppConfig, BrokerConfig, CliConfig};
use rabbitmq_mcp::mcp::{create_mcp_state, serve, McpState, ToolContext};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

pub fn test_broker_config() -> BrokerConfig {
    let cli = CliConfig {
        host: Some(TEST_HOST.to_string()),
        username: TEST_USER.to_string(),
        password: TEST_PASS.to_string(),
        ..Default::default()
    };
    AppConfig::resolve(&cli, None)
        .expect("Failed to resolve test config")
        .broker
}

pub struct TestSession {
    state: Arc<McpState>,
}

impl TestSession {
    pub fn new(
        connector: impl BrokerConnector + 'static,
        admin: impl AdminApi + 'static,
    ) -> Self {
        let handlers = BrokerHandlers::new(Arc::new(connector), Arc::new(admin));
        let ctx = ToolContext::new(handlers, Arc::new(test_broker_config()));
        let state = create_mcp_state(ctx).expect("Tool registry is incomplete");
        Self {
            state: Arc::new(state),
        }
    }

    /// Feeds `lines` to the session, waits for EOF handling to finish and
    /// returns every response line, parsed, in output order.
    pub async fn exchange_lines(&self, lines: &[String]) -> Vec<Value> {
        let mut input = lines.join("\n");
        input.push('\n');

        let (server_out, mut client_in) = tokio::io::duplex(1 << 20);
        serve(input.as_bytes(), server_out, self.state.clone())
            .await
            .expect("Session failed");

        let mut output = String::new();
        client_in
            .read_to_string(&mut output)
            .await
            .expect("Failed to read session output");
        output
            .lines()
            .map(|line| serde_json::from_str(line).expect("Response is not JSON"))
            .collect()
    }

    /// Like [`TestSession::exchange_lines`] for well-formed messages.
    pub async fn exchange(&self, messages: &[Value]) -> Vec<Value> {
        let lines: Vec<String> = messages.iter().map(Value::to_string).collect();
        self.exchange_lines(&lines).await
    }

    /// Initializes the session, then makes one `tools/call` with id 2 and
    /// returns its response.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        let responses = self
            .exchange(&[
                initialize_request(1),
                json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
                json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "method": "tools/call",
                    "params": {"name": name, "arguments": arguments}
                }),
            ])
            .await;
        response_for(&responses, 2)
    }
}

pub fn initialize_request(id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "1.0"}
        }
    })
}

/// The response carrying `id`. Panics if there is none.
pub fn response_for(responses: &[Value], id: i64) -> Value {
    responses
        .iter()
        .find(|r| r["id"] == json!(id))
        .cloned()
        .unwrap_or_else(|| panic!("No response with id {} in {:?}", id, responses))
}

/// Text of a successful `tools/call` response
pub fn result_text(response: &Value) -> String {
    response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("Not a text result: {}", response))
        .to_string()
}
