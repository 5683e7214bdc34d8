//! Provision the remote environment and agent for a session.

use serde::Serialize;

use super::prompt::{environment_spec, AGENT_NAME, SYSTEM_PROMPT};
use crate::platform::{AgentId, AgentSpec, EnvironmentId, PlatformClient, PlatformError};

/// Ids of the provisioned environment and the agent bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentHandles {
    pub environment_id: EnvironmentId,
    pub agent_id: AgentId,
}

/// Create the newsletter environment, then an agent bound to it.
///
/// One attempt each. A failure in either step fails the whole bootstrap.
pub async fn bootstrap(client: &dyn PlatformClient) -> Result<AgentHandles, PlatformError> {
    let environment_id = client.create_environment(&environment_spec()).await?;
    tracing::info!(%environment_id, "Created newsletter environment");

    let agent_id = client
        .create_agent(&AgentSpec {
            environment_id: environment_id.clone(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            name: AGENT_NAME.to_string(),
        })
        .await?;
    tracing::info!(%environment_id, %agent_id, "Created newsletter agent");

    Ok(AgentHandles {
        environment_id,
        agent_id,
    })
}
