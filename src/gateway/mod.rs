//! HTTP collaborators of the invoker: the session token service, the
//! dependency resolution service and the invocation bridge.

mod client;
mod types;

pub use client::GatewayClient;
pub use types::{Artifact, DependencyRequest, DependencyResponse, InvokeReply};
