//! MCP stdio Handler
//!
//! Serves the MCP protocol as newline-delimited JSON-RPC over a byte stream
//! pair (stdin/stdout in production). Tool calls run on their own tasks and
//! every response goes through a single writer task, so output lines never
//! interleave.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::context::ToolContext;
use super::dispatcher::dispatch;
use super::protocol::{
    methods, ClientInfo, InitializeParams, InitializeResult, McpError, McpRequest, McpResponse,
    PingResult, ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability,
    ToolsListResult, JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use super::registry::{McpRegistry, RegistryError};

pub const SERVER_NAME: &str = "rabbitmq-mcp";

/// State shared by every request of a session
pub struct McpState {
    pub registry: Arc<McpRegistry>,
    pub ctx: ToolContext,
}

impl McpState {
    pub fn new(registry: McpRegistry, ctx: ToolContext) -> Self {
        Self {
            registry: Arc::new(registry),
            ctx,
        }
    }
}

/// Create the MCP state with every tool registered and checked
pub fn create_mcp_state(ctx: ToolContext) -> Result<McpState, RegistryError> {
    let registry = super::tools::build_registry()?;
    info!("MCP registry initialized with {} tools", registry.tool_count());
    Ok(McpState::new(registry, ctx))
}

/// Serves the session on the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(state: Arc<McpState>) -> io::Result<()> {
    serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), state).await
}

/// Reads requests from `reader` until EOF and writes responses to `writer`.
///
/// Returns once every in-flight tool call has answered and the last
/// response has been flushed.
pub async fn serve<R, W>(reader: R, writer: W, state: Arc<McpState>) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<McpResponse>();
    let writer_task = tokio::spawn(write_responses(writer, rx));
    let initialized = Arc::new(AtomicBool::new(false));

    debug!("MCP session started");
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request = match parse_request(line) {
            Ok(request) => request,
            Err(response) => {
                send(&tx, response);
                continue;
            }
        };

        if request.method == methods::TOOLS_CALL {
            let state = state.clone();
            let initialized = initialized.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = handle_request(request, &state, &initialized).await {
                    send(&tx, response);
                }
            });
        } else if let Some(response) = handle_request(request, &state, &initialized).await {
            send(&tx, response);
        }
    }
    debug!("MCP input closed, draining pending responses");

    // The writer stops once the last in-flight call drops its sender.
    drop(tx);
    writer_task.await.map_err(io::Error::other)?
}

fn send(tx: &mpsc::UnboundedSender<McpResponse>, response: McpResponse) {
    if tx.send(response).is_err() {
        warn!("Response dropped, output stream is closed");
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<McpResponse>,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize MCP response: {}", e);
                continue;
            }
        };
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

fn parse_request(text: &str) -> Result<McpRequest, McpResponse> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| McpResponse::error(None, McpError::ParseError(e.to_string())))?;

    // Keep the id of a well-formed but invalid request so the caller can
    // correlate the error.
    let id = value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value(id).ok());
    serde_json::from_value(value)
        .map_err(|e| McpResponse::error(id, McpError::InvalidRequest(e.to_string())))
}

async fn handle_request(
    request: McpRequest,
    state: &McpState,
    initialized: &AtomicBool,
) -> Option<McpResponse> {
    // Notifications never get a response.
    let Some(request_id) = request.id.clone() else {
        match request.method.as_str() {
            methods::INITIALIZED => debug!("Client confirmed initialization"),
            other => debug!("Ignoring notification {}", other),
        }
        return None;
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return Some(McpResponse::error(
            Some(request_id),
            McpError::InvalidRequest(format!("unsupported jsonrpc version {}", request.jsonrpc)),
        ));
    }

    let result = match request.method.as_str() {
        methods::INITIALIZE => handle_initialize(&request, initialized),
        methods::PING => handle_ping(),
        methods::TOOLS_LIST => {
            if !initialized.load(Ordering::SeqCst) {
                Err(McpError::InvalidRequest("Not initialized".to_string()))
            } else {
                handle_tools_list(state)
            }
        }
        methods::TOOLS_CALL => {
            if !initialized.load(Ordering::SeqCst) {
                Err(McpError::InvalidRequest("Not initialized".to_string()))
            } else {
                handle_tools_call(&request, state).await
            }
        }
        methods::SHUTDOWN => {
            debug!("Client requested shutdown");
            return None;
        }
        other => Err(McpError::MethodNotFound(other.to_string())),
    };

    Some(match result {
        Ok(value) => McpResponse::success(request_id, value),
        Err(error) => McpResponse::error(Some(request_id), error),
    })
}

fn handle_initialize(request: &McpRequest, initialized: &AtomicBool) -> Result<Value, McpError> {
    let params: InitializeParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .unwrap_or(InitializeParams {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: Default::default(),
            client_info: ClientInfo {
                name: "unknown".to_string(),
                version: "unknown".to_string(),
            },
        });

    info!(
        "MCP client {} {} connected (protocol {})",
        params.client_info.name, params.client_info.version, params.protocol_version
    );
    initialized.store(true, Ordering::SeqCst);

    let result = InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability { list_changed: None }),
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH")),
        },
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_ping() -> Result<Value, McpError> {
    serde_json::to_value(PingResult {}).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_tools_list(state: &McpState) -> Result<Value, McpError> {
    let result = ToolsListResult {
        tools: state.registry.tool_definitions(),
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_call(request: &McpRequest, state: &McpState) -> Result<Value, McpError> {
    let params: ToolsCallParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

    let arguments = params.arguments.unwrap_or(serde_json::json!({}));
    let result = dispatch(&state.registry, state.ctx.clone(), &params.name, arguments).await?;

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}
