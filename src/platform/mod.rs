//! Remote agent platform boundary.
//!
//! Environments, agents, tool calls and memory all live in the hosted
//! platform. Locally we only hold opaque ids and ask for three things:
//! create an environment, create an agent bound to it, and send a message.

mod lyzr;
mod types;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use thiserror::Error;

pub use lyzr::LyzrClient;
pub use types::{
    AgentId, AgentSpec, EnvironmentFeature, EnvironmentId, EnvironmentSpec, FeatureKind,
    SendMessage,
};

/// Errors from a platform call.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("platform returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid platform response: {0}")]
    Decode(String),

    #[error("platform response is missing `{0}`")]
    MissingField(&'static str),
}

/// Client for the hosted agent platform.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Create an execution environment and return its id.
    async fn create_environment(&self, spec: &EnvironmentSpec)
        -> Result<EnvironmentId, PlatformError>;

    /// Create an agent bound to an environment and return its id.
    async fn create_agent(&self, spec: &AgentSpec) -> Result<AgentId, PlatformError>;

    /// Send one message to an agent and return the generated text.
    async fn send_message(&self, message: &SendMessage) -> Result<String, PlatformError>;
}
