//! HTTP client for the Lyzr agent API.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::types::{AgentId, AgentSpec, EnvironmentFeature, EnvironmentId, EnvironmentSpec, SendMessage};
use super::{PlatformClient, PlatformError};
use crate::config::Config;

/// Longest slice of an error body kept in `PlatformError::Status`.
const MAX_ERROR_BODY: usize = 500;

#[derive(Serialize)]
struct CreateEnvironmentBody<'a> {
    name: &'a str,
    features: &'a [EnvironmentFeature],
    tools: &'a [String],
    llm_api_key: &'a str,
}

#[derive(Serialize)]
struct CreateAgentBody<'a> {
    env_id: &'a str,
    system_prompt: &'a str,
    name: &'a str,
    agent_persona: &'a str,
    agent_instructions: &'a str,
    agent_description: &'a str,
}

#[derive(Deserialize)]
struct EnvironmentCreated {
    #[serde(default)]
    env_id: Option<String>,
}

#[derive(Deserialize)]
struct AgentCreated {
    #[serde(default)]
    agent_id: Option<String>,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    response: Option<String>,
}

/// Lyzr agent API client.
#[derive(Clone)]
pub struct LyzrClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    llm_api_key: String,
}

impl fmt::Debug for LyzrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LyzrClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl LyzrClient {
    /// Build a client from configuration. Every request is bounded by
    /// `config.request_timeout`.
    pub fn new(config: &Config) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("newsletter-agent/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.lyzr_api_key.clone(),
            llm_api_key: config.llm_api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, PlatformError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!(%url, "Calling platform");

        let response = self
            .http
            .post(&url)
            .header("accept", "application/json")
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "Platform rejected request");
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&text).map_err(|e| PlatformError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PlatformClient for LyzrClient {
    async fn create_environment(
        &self,
        spec: &EnvironmentSpec,
    ) -> Result<EnvironmentId, PlatformError> {
        let body = CreateEnvironmentBody {
            name: &spec.name,
            features: &spec.features,
            tools: &spec.tools,
            llm_api_key: &self.llm_api_key,
        };
        let created: EnvironmentCreated = self.post_json("environment", &body).await?;
        non_empty(created.env_id, "env_id").map(EnvironmentId)
    }

    async fn create_agent(&self, spec: &AgentSpec) -> Result<AgentId, PlatformError> {
        let body = CreateAgentBody {
            env_id: &spec.environment_id.0,
            system_prompt: &spec.system_prompt,
            name: &spec.name,
            agent_persona: "",
            agent_instructions: "",
            agent_description: "",
        };
        let created: AgentCreated = self.post_json("agent", &body).await?;
        non_empty(created.agent_id, "agent_id").map(AgentId)
    }

    async fn send_message(&self, message: &SendMessage) -> Result<String, PlatformError> {
        let reply: ChatReply = self.post_json("chat/", message).await?;
        reply.response.ok_or(PlatformError::MissingField("response"))
    }
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, PlatformError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(PlatformError::MissingField(field))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}
