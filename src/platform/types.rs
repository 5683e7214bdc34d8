//! Platform request and response types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque execution environment id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentId(pub String);

/// Opaque agent id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability switched on in an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureKind {
    /// Agent may call the environment's tools
    ToolCalling,
    /// Agent keeps conversation memory within a session
    ShortTermMemory,
}

/// One entry in an environment's feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentFeature {
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub config: serde_json::Value,
    pub priority: u32,
}

/// What to provision for an environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentSpec {
    pub name: String,
    pub features: Vec<EnvironmentFeature>,
    pub tools: Vec<String>,
}

/// What to provision for an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub environment_id: EnvironmentId,
    pub system_prompt: String,
    pub name: String,
}

/// A single message to an agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessage {
    pub agent_id: AgentId,
    pub user_id: String,
    pub session_id: String,
    pub message: String,
}
