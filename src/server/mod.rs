//! Server module: JSON-RPC 2.0 over stdio.
//!
//! This module provides:
//! - the line-oriented JSON-RPC loop that also forwards call outcomes
//! - method handlers and routing
//! - shared application state

mod handlers;
mod rpc;

pub use handlers::handle_method;
pub use rpc::*;

use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::{CallDispatcher, ResultStream, SessionToken};
use crate::error::AppResult;
use crate::gateway::GatewayClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Gateway client (dependency service).
    pub gateway: GatewayClient,
    /// Dispatcher for generic invocations.
    pub dispatcher: CallDispatcher,
}

impl AppState {
    /// Wire the gateway in as token source and transport, and create the
    /// dispatcher. Returns the state and the stream of call outcomes.
    pub fn new(config: Config) -> AppResult<(Self, ResultStream)> {
        let gateway = GatewayClient::new(&config.gateway, config.request.clone())?;
        let shared = Arc::new(gateway.clone());
        let token = Arc::new(SessionToken::new(shared.clone()));
        let (dispatcher, results) = CallDispatcher::new(shared, token, &config.invoke);

        tracing::info!(
            gateway = %gateway.base_url(),
            invoke_timeout_ms = config.invoke.timeout_ms,
            "AppState initialized"
        );

        Ok((Self::from_parts(config, gateway, dispatcher), results))
    }

    /// Assemble state from already built parts.
    pub fn from_parts(config: Config, gateway: GatewayClient, dispatcher: CallDispatcher) -> Self {
        Self {
            config,
            gateway,
            dispatcher,
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;
