use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use uuid::Uuid;

/// Progress of an in-flight call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Registered, waiting for the session token.
    Created,
    /// Token in hand, request being built.
    TokenAcquired,
    /// Handed to the transport; the timeout is running.
    Sent,
}

/// Correlation state of one in-flight call.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub call_id: Uuid,
    pub echo: String,
    pub state: CallState,
    pub token: Option<String>,
    pub deadline: Option<Instant>,
}

/// Registry of in-flight calls.
///
/// Removing an entry is the single decision point of a call: whoever removes
/// it (reply, timeout, or a failure on the way) publishes the outcome, and
/// everyone after finds nothing to remove.
#[derive(Debug, Clone, Default)]
pub struct PendingCalls {
    inner: Arc<Mutex<HashMap<Uuid, PendingCall>>>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PendingCall>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new call in the `Created` state.
    pub fn register(&self, echo: &str) -> Uuid {
        let call_id = Uuid::new_v4();
        self.lock().insert(
            call_id,
            PendingCall {
                call_id,
                echo: echo.to_string(),
                state: CallState::Created,
                token: None,
                deadline: None,
            },
        );
        call_id
    }

    /// Record the token of a call. No-op once the call has settled.
    pub fn token_acquired(&self, call_id: &Uuid, token: &str) {
        if let Some(call) = self.lock().get_mut(call_id) {
            call.state = CallState::TokenAcquired;
            call.token = Some(token.to_string());
        }
    }

    /// Record that a call went out with the given deadline.
    pub fn sent(&self, call_id: &Uuid, deadline: Instant) {
        if let Some(call) = self.lock().get_mut(call_id) {
            call.state = CallState::Sent;
            call.deadline = Some(deadline);
        }
    }

    /// Take the call out of the registry. Only the first caller gets it.
    pub fn settle(&self, call_id: &Uuid) -> Option<PendingCall> {
        self.lock().remove(call_id)
    }

    /// Snapshot of one call.
    pub fn get(&self, call_id: &Uuid) -> Option<PendingCall> {
        self.lock().get(call_id).cloned()
    }

    /// Number of calls that have not settled yet.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
