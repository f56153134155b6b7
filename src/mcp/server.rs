use crate::app::App;
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::catalog::tool_catalog;
use crate::mcp::protocol::{CallToolResult, JsonRpcRequest, JsonRpcResponse, ToolCallParams};
use crate::services::logger::Logger;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "aem-admin";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct McpServer {
    app: Arc<App>,
    logger: Logger,
}

type SharedWriter<W> = Arc<Mutex<BufWriter<W>>>;

async fn write_response<W>(writer: &SharedWriter<W>, response: &JsonRpcResponse) -> Result<(), ToolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_string(response)
        .map_err(|err| ToolError::internal(format!("Failed to encode response: {}", err)))?;
    let mut guard = writer.lock().await;
    guard.write_all(payload.as_bytes()).await?;
    guard.write_all(b"\n").await?;
    guard.flush().await?;
    Ok(())
}

impl McpServer {
    pub fn new(app: App) -> Self {
        let logger = app.logger.child("mcp");
        Self {
            app: Arc::new(app),
            logger,
        }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": tool_catalog() })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        let params: ToolCallParams = serde_json::from_value(params)
            .map_err(|_| McpError::new(ErrorCode::InvalidParams, "Invalid tools/call params"))?;
        if params.name.is_empty() {
            return Err(McpError::new(ErrorCode::InvalidParams, "Missing tool name"));
        }
        let output = self
            .app
            .tool_executor
            .execute(&params.name, params.arguments)
            .await
            .map_err(|err| McpError::from(&err))?;
        serde_json::to_value(CallToolResult::from(output))
            .map_err(|err| McpError::new(ErrorCode::InternalError, err.to_string()))
    }

    /// Parses one line of input. Lines that cannot be answered normally get
    /// their JSON-RPC error response back as `Err`.
    pub fn parse_message(&self, line: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
        let parsed: Value = serde_json::from_str(line).map_err(|_| {
            JsonRpcResponse::failure(Value::Null, ErrorCode::ParseError.as_i32(), "Parse error")
        })?;
        serde_json::from_value(parsed).map_err(|_| {
            JsonRpcResponse::failure(
                Value::Null,
                ErrorCode::InvalidRequest.as_i32(),
                "Invalid request",
            )
        })
    }

    /// Answers one request. Notifications (no id) never get a response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id?;
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.handle_initialize()),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.handle_tools_list()),
            "tools/call" => match self.handle_tools_call(request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(err) => JsonRpcResponse::failure(id, err.code.as_i32(), err.message),
            },
            method if method.starts_with("notifications/") => {
                JsonRpcResponse::success(id, serde_json::json!({}))
            }
            _ => JsonRpcResponse::failure(
                id,
                ErrorCode::MethodNotFound.as_i32(),
                "Method not found",
            ),
        };
        Some(response)
    }

    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match self.parse_message(line) {
            Ok(request) => self.handle_request(request).await,
            Err(response) => Some(response),
        }
    }

    /// Serves newline-delimited JSON-RPC until `reader` reaches EOF. Tool
    /// calls run as separate tasks so a slow upstream never blocks other calls.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<(), ToolError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut reader = BufReader::new(reader);
        let writer: SharedWriter<W> = Arc::new(Mutex::new(BufWriter::new(writer)));
        let mut in_flight = JoinSet::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(_) => {
                    self.logger.warn("Dropping input line that is not valid UTF-8", None);
                    let response = JsonRpcResponse::failure(
                        Value::Null,
                        ErrorCode::ParseError.as_i32(),
                        "Parse error",
                    );
                    write_response(&writer, &response).await?;
                    continue;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let request = match self.parse_message(trimmed) {
                Ok(request) => request,
                Err(response) => {
                    write_response(&writer, &response).await?;
                    continue;
                }
            };

            if request.method == "tools/call" {
                let server = self.clone();
                let writer = writer.clone();
                in_flight.spawn(async move {
                    if let Some(response) = server.handle_request(request).await {
                        if let Err(err) = write_response(&writer, &response).await {
                            server.logger.error(
                                "Failed to write response",
                                Some(&serde_json::json!({ "error": err.message })),
                            );
                        }
                    }
                });
            } else if let Some(response) = self.handle_request(request).await {
                write_response(&writer, &response).await?;
            }

            while in_flight.try_join_next().is_some() {}
        }

        while in_flight.join_next().await.is_some() {}
        self.logger.info("Input closed, shutting down", None);
        Ok(())
    }
}

/// Validates configuration, then serves MCP over stdin/stdout.
pub async fn run_stdio(app: App) -> Result<(), ToolError> {
    app.config.ensure_valid()?;
    let server = Arc::new(McpServer::new(app));
    server.logger.info("MCP server connected on stdio", None);
    server
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await
}
