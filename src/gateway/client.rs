use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{DependencyRequest, DependencyResponse, InvokeReply};
use crate::config::{GatewayConfig, RequestConfig};
use crate::dispatch::{InvocationRequest, TokenSource, Transport};
use crate::error::{DispatchError, GatewayError, GatewayResult};

/// Client for the local gateway: token service, dependency service and the
/// HTTP bridge to the RPC transport.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    invoke_path: String,
    request_config: RequestConfig,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(config: &GatewayConfig, request_config: RequestConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(GatewayError::Http)?;

        let invoke_path = if config.invoke_path.starts_with('/') {
            config.invoke_path.clone()
        } else {
            format!("/{}", config.invoke_path)
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            invoke_path,
            request_config,
        })
    }

    /// Fetch a session token from `GET /socket_token`.
    pub async fn socket_token(&self) -> GatewayResult<String> {
        let url = format!("{}/socket_token", self.base_url);
        debug!(url = %url, "Requesting session token");

        let response = self.send(self.client.get(&url)).await?;
        let token = response
            .text()
            .await
            .map_err(|e| GatewayError::InvalidResponse {
                message: format!("Failed to read token: {}", e),
            })?;

        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(GatewayError::InvalidResponse {
                message: "Empty session token".to_string(),
            });
        }
        Ok(token)
    }

    /// Ask the gateway to resolve and download the artifact providing an
    /// interface. A `success: false` envelope is reported as an API error.
    pub async fn download_dependency(
        &self,
        request: &DependencyRequest,
    ) -> GatewayResult<DependencyResponse<Value>> {
        let url = format!("{}/nexus/dependency/download", self.base_url);
        info!(
            echo = %request.echo,
            interface = %request.interface_name,
            method = %request.method_name,
            "Requesting dependency download"
        );

        let response = self.send(self.client.post(&url).json(request)).await?;
        let body: DependencyResponse<Value> = Self::parse(response, "dependency").await?;

        if !body.success {
            return Err(GatewayError::Api {
                status: 200,
                message: body.message,
            });
        }
        Ok(body)
    }

    /// Relay one invocation to the transport bridge.
    pub async fn invoke_bridge(&self, request: &InvocationRequest) -> GatewayResult<InvokeReply> {
        let url = format!("{}{}", self.base_url, self.invoke_path);
        let start = Instant::now();
        debug!(
            echo = %request.echo,
            interface = %request.interface_name,
            method = %request.method,
            args = request.args.len(),
            "Calling invocation bridge"
        );

        let result = match self.send(self.client.post(&url).json(request)).await {
            Ok(response) => Self::parse::<InvokeReply>(response, "invoke").await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => info!(
                echo = %request.echo,
                latency_ms = start.elapsed().as_millis(),
                "Invocation bridge replied"
            ),
            Err(e) => error!(
                echo = %request.echo,
                error = %e,
                latency_ms = start.elapsed().as_millis(),
                "Invocation bridge call failed"
            ),
        }
        result
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    timeout_ms: self.request_config.timeout_ms,
                }
            } else {
                GatewayError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> GatewayResult<T> {
        response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse {
                message: format!("Failed to parse {} response: {}", what, e),
            })
    }
}

/// Text of a bridge error: strings verbatim, anything else as JSON.
fn error_message(error: Value) -> String {
    match error {
        Value::String(message) => message,
        other => other.to_string(),
    }
}

#[async_trait]
impl TokenSource for GatewayClient {
    async fn fetch_token(&self) -> Result<String, DispatchError> {
        self.socket_token()
            .await
            .map_err(|e| DispatchError::Token {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl Transport for GatewayClient {
    async fn invoke(&self, request: &InvocationRequest) -> Result<Value, DispatchError> {
        let reply = self.invoke_bridge(request).await?;
        match reply.error {
            Some(error) => Err(DispatchError::Transport {
                message: error_message(error),
            }),
            None => Ok(reply.result.unwrap_or(Value::Null)),
        }
    }
}
