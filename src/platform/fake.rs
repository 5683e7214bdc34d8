//! In-process platform double that records every call.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{AgentId, AgentSpec, EnvironmentId, EnvironmentSpec, PlatformClient, PlatformError, SendMessage};

#[derive(Default)]
pub(crate) struct FakePlatform {
    pub environments: AtomicUsize,
    pub agents: AtomicUsize,
    pub sent: Mutex<Vec<SendMessage>>,
    pub created_agents: Mutex<Vec<AgentSpec>>,
    pub fail_environment: bool,
    pub fail_messages: AtomicBool,
    /// Added to every environment creation and message
    pub delay: Option<Duration>,
}

impl FakePlatform {
    pub fn failing_environment() -> Self {
        Self {
            fail_environment: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_fail_messages(&self, fail: bool) {
        self.fail_messages.store(fail, Ordering::SeqCst);
    }

    pub fn environment_calls(&self) -> usize {
        self.environments.load(Ordering::SeqCst)
    }

    pub fn agent_calls(&self) -> usize {
        self.agents.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SendMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn create_environment(
        &self,
        _spec: &EnvironmentSpec,
    ) -> Result<EnvironmentId, PlatformError> {
        let n = self.environments.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_environment {
            return Err(PlatformError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        // Let concurrent callers pile up behind the first one.
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        Ok(EnvironmentId(format!("env-{n}")))
    }

    async fn create_agent(&self, spec: &AgentSpec) -> Result<AgentId, PlatformError> {
        let n = self.agents.fetch_add(1, Ordering::SeqCst) + 1;
        self.created_agents.lock().unwrap().push(spec.clone());
        Ok(AgentId(format!("agent-{n}")))
    }

    async fn send_message(&self, message: &SendMessage) -> Result<String, PlatformError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().unwrap().push(message.clone());
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(PlatformError::Decode("connection reset".into()));
        }
        Ok(format!("Newsletter about {}", message.message))
    }
}
