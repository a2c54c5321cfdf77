//! Asynchronous call dispatch and reply correlation.
//!
//! A call moves through `CREATED → TOKEN_ACQUIRED → SENT` and ends in exactly
//! one terminal outcome: the transport's reply (or error), or a timeout.
//! Outcomes of all calls are published on one shared stream and carry the
//! caller's `echo` so the subscriber can route them back to their origin.

mod pending;
mod session;

pub use pending::{CallState, PendingCall, PendingCalls};
#[cfg(test)]
pub use session::MockTokenSource;
pub use session::{SessionToken, TokenSource};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::InvokeConfig;
use crate::error::DispatchError;

/// The RPC capability: invoke a method on a remote interface.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the invocation and return the remote result.
    async fn invoke(&self, request: &InvocationRequest) -> Result<Value, DispatchError>;
}

/// What to call, as built from a tab's form and parameter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSpec {
    pub address: String,
    pub interface_name: String,
    pub method: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub group: String,
    /// Per-call timeout; the dispatcher default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Flattened argument list (single-key objects).
    #[serde(default)]
    pub args: Vec<Value>,
}

/// A call as handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    pub address: String,
    pub interface_name: String,
    pub method: String,
    pub version: String,
    pub group: String,
    pub timeout_ms: u64,
    pub args: Vec<Value>,
    pub token: String,
    pub echo: String,
}

impl InvocationRequest {
    fn new(spec: CallSpec, timeout_ms: u64, token: String, echo: String) -> Self {
        Self {
            address: spec.address,
            interface_name: spec.interface_name,
            method: spec.method,
            version: spec.version,
            group: spec.group,
            timeout_ms,
            args: spec.args,
            token,
            echo,
        }
    }
}

/// Terminal status of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The transport returned a result.
    Replied(Value),
    /// The transport (or token acquisition) reported an error.
    Failed(String),
    /// The timeout fired first.
    TimedOut,
}

impl OutcomeStatus {
    /// Text to show for this outcome.
    pub fn message(&self) -> String {
        match self {
            OutcomeStatus::Replied(value) => format!("{:#}", value),
            OutcomeStatus::Failed(message) => message.clone(),
            OutcomeStatus::TimedOut => "timeout".to_string(),
        }
    }
}

/// One message on the result stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub echo: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Receiving end of the shared result stream.
pub type ResultStream = mpsc::UnboundedReceiver<CallOutcome>;

/// Issues calls and publishes their outcomes.
///
/// Cheap to clone; clones share the token, the registry and the stream.
#[derive(Clone)]
pub struct CallDispatcher {
    transport: Arc<dyn Transport>,
    token: Arc<SessionToken>,
    pending: PendingCalls,
    results: mpsc::UnboundedSender<CallOutcome>,
    dispatched: Arc<AtomicUsize>,
    default_timeout_ms: u64,
}

impl CallDispatcher {
    /// Create a dispatcher and the stream its outcomes arrive on.
    pub fn new(
        transport: Arc<dyn Transport>,
        token: Arc<SessionToken>,
        config: &InvokeConfig,
    ) -> (Self, ResultStream) {
        let (results, stream) = mpsc::unbounded_channel();
        let dispatcher = Self {
            transport,
            token,
            pending: PendingCalls::new(),
            results,
            dispatched: Arc::new(AtomicUsize::new(0)),
            default_timeout_ms: config.timeout_ms,
        };
        (dispatcher, stream)
    }

    /// Issue a call. Returns immediately; the outcome arrives on the result
    /// stream tagged with `echo`. Must be called within a tokio runtime.
    pub fn dispatch(&self, spec: CallSpec, echo: impl Into<String>) {
        let echo = echo.into();
        let call_id = self.pending.register(&echo);
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        info!(
            echo = %echo,
            call_id = %call_id,
            interface = %spec.interface_name,
            method = %spec.method,
            "Dispatching call"
        );
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.run(call_id, spec, echo).await });
    }

    /// Number of calls without a terminal outcome yet.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Total number of calls dispatched so far. Each one produces exactly
    /// one message on the result stream.
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// The session token shared with other gateway calls.
    pub fn session(&self) -> &Arc<SessionToken> {
        &self.token
    }

    async fn run(&self, call_id: Uuid, spec: CallSpec, echo: String) {
        let token = match self.token.get().await {
            Ok(token) => token,
            Err(e) => {
                self.settle(&call_id, &echo, OutcomeStatus::Failed(e.to_string()));
                return;
            }
        };
        self.pending.token_acquired(&call_id, &token);

        let timeout_ms = spec
            .timeout_ms
            .filter(|ms| *ms > 0)
            .unwrap_or(self.default_timeout_ms);
        let request = InvocationRequest::new(spec, timeout_ms, token, echo.clone());
        let started = Instant::now();
        let deadline = started + Duration::from_millis(timeout_ms);
        self.pending.sent(&call_id, deadline);

        // Whichever branch completes first decides; the other is dropped.
        let status = tokio::select! {
            reply = self.transport.invoke(&request) => match reply {
                Ok(value) => OutcomeStatus::Replied(value),
                Err(DispatchError::Transport { message }) => OutcomeStatus::Failed(message),
                Err(e) => OutcomeStatus::Failed(e.to_string()),
            },
            _ = tokio::time::sleep_until(deadline) => OutcomeStatus::TimedOut,
        };

        debug!(
            echo = %echo,
            call_id = %call_id,
            latency_ms = started.elapsed().as_millis(),
            "Call settled"
        );
        self.settle(&call_id, &echo, status);
    }

    /// Publish `status` if this call has not settled yet.
    fn settle(&self, call_id: &Uuid, echo: &str, status: OutcomeStatus) -> bool {
        if self.pending.settle(call_id).is_none() {
            debug!(echo = %echo, call_id = %call_id, "Discarding late outcome");
            return false;
        }
        match &status {
            OutcomeStatus::TimedOut => warn!(echo = %echo, "Call timed out"),
            OutcomeStatus::Failed(message) => warn!(echo = %echo, error = %message, "Call failed"),
            OutcomeStatus::Replied(_) => info!(echo = %echo, "Call replied"),
        }
        let outcome = CallOutcome {
            echo: echo.to_string(),
            status,
        };
        if self.results.send(outcome).is_err() {
            debug!(echo = %echo, "Result stream closed, outcome dropped");
        }
        true
    }
}
