//! # Generic Invoker
//!
//! Engine of a generic-invocation test box for distributed-object RPC
//! (Dubbo-style): a developer builds a call against an address, interface,
//! method, version and group with an ordered, typed argument list, sends it,
//! and inspects the reply.
//!
//! ## Features
//!
//! - **Parameter trees**: typed, user-edited argument model with include
//!   propagation
//! - **Type inference**: node kind, default value and hints from a textual
//!   type descriptor
//! - **Tree codec**: tree to wire arguments and back, including validation of
//!   hand-edited wire JSON
//! - **Call dispatch**: token acquisition, echo-keyed correlation and a
//!   timeout race with exactly one outcome per call
//! - **Tabs**: base64 snapshot export/import and provider URL resolution
//!
//! ## Architecture
//!
//! ```text
//! Client → JSON-RPC (stdio) → CallDispatcher → Transport (HTTP gateway)
//!                ↑                   ↓
//!                └── invoke/outcome ─┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use generic_invoker::{AppState, Config, RpcServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let (state, results) = AppState::new(config)?;
//!     RpcServer::new(Arc::new(state), results).run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line interface.
pub mod cli;
/// Tree codec: parameter trees to wire arguments and back.
pub mod codec;
/// Configuration management.
pub mod config;
/// Asynchronous call dispatch and reply correlation.
pub mod dispatch;
/// Error types and result aliases for the application.
pub mod error;
/// HTTP gateway client: token, dependency and invocation services.
pub mod gateway;
/// Type inference from textual type descriptors.
pub mod inference;
/// Parameter tree model and edit operations.
pub mod params;
/// JSON-RPC server implementation and request handling.
pub mod server;
/// Tab snapshots and provider URL resolution.
pub mod tabs;

pub use config::Config;
pub use dispatch::{CallDispatcher, CallOutcome, CallSpec, OutcomeStatus};
pub use error::{AppError, AppResult};
pub use params::{Item, ItemKind};
pub use server::{AppState, RpcServer, SharedState};
