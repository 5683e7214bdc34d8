//! Send a topic to the bootstrapped agent.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::bootstrap::AgentHandles;
use super::EMPTY_TOPIC_WARNING;
use crate::platform::{PlatformClient, PlatformError, SendMessage};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{}", EMPTY_TOPIC_WARNING)]
    EmptyTopic,

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// One topic and the newsletter generated for it.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub topic: String,
    pub newsletter: String,
    pub generated_at: DateTime<Utc>,
}

/// Reject topics with no visible content.
pub fn validate_topic(topic: &str) -> Result<(), DispatchError> {
    if topic.trim().is_empty() {
        Err(DispatchError::EmptyTopic)
    } else {
        Ok(())
    }
}

/// Sends topics as messages to an agent on behalf of one caller.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn PlatformClient>,
    user_id: String,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn PlatformClient>, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
        }
    }

    pub fn platform(&self) -> &dyn PlatformClient {
        self.client.as_ref()
    }

    /// Send `topic` to the agent in `handles` and return the reply verbatim.
    ///
    /// The topic is sent as submitted. Blank topics never reach the platform.
    pub async fn dispatch(
        &self,
        handles: &AgentHandles,
        session_id: &str,
        topic: &str,
    ) -> Result<Exchange, DispatchError> {
        validate_topic(topic)?;

        let message = SendMessage {
            agent_id: handles.agent_id.clone(),
            user_id: self.user_id.clone(),
            session_id: session_id.to_string(),
            message: topic.to_string(),
        };

        tracing::debug!(agent_id = %handles.agent_id, session_id, "Dispatching topic");
        let newsletter = self.client.send_message(&message).await?;

        Ok(Exchange {
            topic: topic.to_string(),
            newsletter,
            generated_at: Utc::now(),
        })
    }
}
