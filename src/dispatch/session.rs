use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::DispatchError;

/// Source of the session token required to open the result channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Fetch a fresh token.
    async fn fetch_token(&self) -> Result<String, DispatchError>;
}

/// Lazily fetched, process-lifetime session token.
///
/// Created once at startup and shared by every call site. The first caller
/// performs the fetch; callers arriving while it is in flight wait for that
/// same fetch. A failed fetch leaves the token unset so a later call retries.
pub struct SessionToken {
    source: Arc<dyn TokenSource>,
    cell: OnceCell<String>,
}

impl SessionToken {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// The cached token, fetching it on first use.
    pub async fn get(&self) -> Result<String, DispatchError> {
        self.cell
            .get_or_try_init(|| async {
                debug!("Fetching session token");
                match self.source.fetch_token().await {
                    Ok(token) => {
                        info!("Session token acquired");
                        Ok(token)
                    }
                    Err(e) => {
                        warn!(error = %e, "Session token fetch failed");
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }

    /// The token if it has already been fetched.
    pub fn cached(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }
}
