//! JSON-RPC 2.0 protocol over stdio.
//!
//! Requests arrive one per line on stdin; responses and `invoke/outcome`
//! notifications leave one per line on stdout. The two are interleaved in
//! the order they become available.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use super::{handle_method, SharedState};
use crate::dispatch::{CallOutcome, ResultStream};
use crate::error::RpcError;

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod rpc_tests;

/// Method name of the outcome notification.
pub const OUTCOME_NOTIFICATION: &str = "invoke/outcome";

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request identifier (None for notifications).
    pub id: Option<Value>,
    /// The method name to invoke.
    pub method: String,
    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Request identifier (null when the request could not be read).
    pub id: Value,
    /// The result on success (mutually exclusive with error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure (mutually exclusive with result).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code (negative for predefined errors).
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Server-initiated JSON-RPC 2.0 notification.
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

impl JsonRpcNotification {
    /// Notification carrying one call outcome.
    pub fn outcome(outcome: &CallOutcome) -> serde_json::Result<Self> {
        Ok(Self {
            jsonrpc: "2.0".to_string(),
            method: OUTCOME_NOTIFICATION.to_string(),
            params: serde_json::to_value(outcome)?,
        })
    }
}

/// JSON-RPC error code for a handler error.
pub fn error_code(err: &RpcError) -> i32 {
    match err {
        RpcError::UnknownMethod { .. } => -32601,
        RpcError::InvalidParams { .. } => -32602,
        RpcError::Json(_) => -32603,
        RpcError::ExecutionFailed { .. } => -32000,
    }
}

/// Server running over stdio.
pub struct RpcServer {
    state: SharedState,
    results: ResultStream,
    /// Outcomes written so far.
    delivered: usize,
}

impl RpcServer {
    /// Create a new server reading outcomes from `results`
    pub fn new(state: SharedState, results: ResultStream) -> Self {
        Self {
            state,
            results,
            delivered: 0,
        }
    }

    /// Run the server using async stdio
    pub async fn run(self) -> std::io::Result<()> {
        info!("Generic invoker server starting...");
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        self.run_with(stdin, &mut stdout).await
    }

    /// Run the protocol loop over arbitrary streams.
    ///
    /// After end of input the loop keeps running until every dispatched call
    /// has delivered its outcome.
    pub async fn run_with<R, W>(mut self, reader: R, writer: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut input_open = true;

        loop {
            if !input_open && self.delivered >= self.state.dispatcher.dispatched() {
                break;
            }

            tokio::select! {
                line = lines.next_line(), if input_open => match line? {
                    Some(line) => {
                        if let Some(response) = self.handle_line(&line).await {
                            let json = serde_json::to_string(&response)?;
                            debug!(response = %json, "Sending response");
                            write_line(writer, &json).await?;
                        }
                    }
                    None => {
                        info!(
                            pending = self.state.dispatcher.in_flight(),
                            "EOF received, waiting for outstanding calls"
                        );
                        input_open = false;
                    }
                },
                outcome = self.results.recv() => match outcome {
                    Some(outcome) => {
                        self.delivered += 1;
                        let notification = JsonRpcNotification::outcome(&outcome)?;
                        write_line(writer, &serde_json::to_string(&notification)?).await?;
                    }
                    None => {
                        warn!("Result stream closed");
                        break;
                    }
                },
            }
        }

        info!("Server shutting down");
        Ok(())
    }

    /// Handle one input line. Returns None for blank lines and notifications.
    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        debug!(request = %trimmed, "Received request");

        match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                error!(error = %e, "Failed to parse request");
                Some(JsonRpcResponse::error(
                    None,
                    -32700,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Handle a single JSON-RPC request.
    /// Returns None for notifications (requests without id).
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let is_notification = request.id.is_none();
        if request.jsonrpc != "2.0" {
            warn!(version = %request.jsonrpc, "Unexpected JSON-RPC version");
        }

        let result = match request.method.as_str() {
            "initialize" => Ok(initialize_result()),
            "initialized" | "notifications/cancelled" => {
                debug!(method = %request.method, "Received notification");
                return None;
            }
            "ping" => Ok(Value::Object(Default::default())),
            method => handle_method(&self.state, method, request.params).await,
        };

        if is_notification {
            if let Err(e) = &result {
                debug!(method = %request.method, error = %e, "Notification failed, ignoring");
            }
            return None;
        }

        Some(match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => {
                error!(method = %request.method, error = %e, "Request failed");
                JsonRpcResponse::error(request.id, error_code(&e), e.to_string())
            }
        })
    }
}

fn initialize_result() -> Value {
    serde_json::json!({
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "capabilities": {
            "methods": super::handlers::METHODS,
            "notifications": [OUTCOME_NOTIFICATION],
        }
    })
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> std::io::Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
