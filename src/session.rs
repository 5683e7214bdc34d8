//! In-memory session store (non-persistent).
//!
//! Each browser session owns at most one bootstrap result. The result is
//! written once and read-only afterwards, so a failed bootstrap stays failed
//! for the lifetime of that session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell, RwLock};
use uuid::Uuid;

use crate::newsletter::{self, validate_topic, AgentHandles, DispatchError, Dispatcher, Exchange};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No platform resources yet
    Uninitialized,
    /// Environment and agent are being created
    Bootstrapping,
    /// Agent is available for topics
    Ready,
    /// A topic is with the platform
    Dispatching,
    /// Bootstrap failed; the session cannot proceed
    Failed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session bootstrap failed: {0}")]
    BootstrapFailed(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("session task ended unexpectedly: {0}")]
    Interrupted(String),
}

pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_seen: RwLock<Instant>,
    phase: RwLock<SessionPhase>,
    handles: OnceCell<Result<AgentHandles, String>>,
    /// Held for the duration of one dispatch
    turn: Mutex<()>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_seen: RwLock::new(Instant::now()),
            phase: RwLock::new(SessionPhase::Uninitialized),
            handles: OnceCell::new(),
            turn: Mutex::new(()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn phase(&self) -> SessionPhase {
        *self.phase.read().await
    }

    /// Cached handles, if bootstrap has succeeded.
    pub fn handles(&self) -> Option<&AgentHandles> {
        self.handles.get().and_then(|r| r.as_ref().ok())
    }

    async fn set_phase(&self, phase: SessionPhase) {
        *self.phase.write().await = phase;
    }

    async fn touch(&self) {
        *self.last_seen.write().await = Instant::now();
    }

    /// True while a bootstrap or dispatch is with the platform.
    async fn is_busy(&self) -> bool {
        let phase = *self.phase.read().await;
        matches!(phase, SessionPhase::Bootstrapping | SessionPhase::Dispatching)
            || self.turn.try_lock().is_err()
    }

    /// Bootstrap on first call; later calls return the cached outcome.
    ///
    /// Concurrent first calls share a single bootstrap. The platform work
    /// runs on its own task, so it completes and is cached even if the
    /// caller is dropped midway.
    pub async fn ensure_bootstrapped(
        self: &Arc<Self>,
        dispatcher: &Dispatcher,
    ) -> Result<AgentHandles, SessionError> {
        if let Some(outcome) = self.handles.get() {
            return outcome.clone().map_err(SessionError::BootstrapFailed);
        }

        let session = Arc::clone(self);
        let dispatcher = dispatcher.clone();
        let task = tokio::spawn(async move {
            session
                .handles
                .get_or_init(|| async {
                    session.set_phase(SessionPhase::Bootstrapping).await;
                    match newsletter::bootstrap(dispatcher.platform()).await {
                        Ok(handles) => {
                            session.set_phase(SessionPhase::Ready).await;
                            Ok(handles)
                        }
                        Err(e) => {
                            tracing::error!(session_id = %session.id, "Session bootstrap failed: {}", e);
                            session.set_phase(SessionPhase::Failed).await;
                            Err(e.to_string())
                        }
                    }
                })
                .await
                .clone()
        });

        task.await
            .map_err(|e| SessionError::Interrupted(e.to_string()))?
            .map_err(SessionError::BootstrapFailed)
    }

    /// Run one exchange: validate, bootstrap if needed, dispatch.
    ///
    /// Blank topics are rejected before any platform call, including the
    /// bootstrap. Dispatches within a session run one at a time, each on its
    /// own task; after each one, successful or not, the session is `Ready`.
    pub async fn generate(
        self: &Arc<Self>,
        dispatcher: &Dispatcher,
        topic: &str,
    ) -> Result<Exchange, SessionError> {
        validate_topic(topic)?;
        let handles = self.ensure_bootstrapped(dispatcher).await?;

        let session = Arc::clone(self);
        let dispatcher = dispatcher.clone();
        let topic = topic.to_string();
        let task = tokio::spawn(async move {
            let _turn = session.turn.lock().await;
            session.set_phase(SessionPhase::Dispatching).await;
            let result = dispatcher
                .dispatch(&handles, &session.id.to_string(), &topic)
                .await;
            session.set_phase(SessionPhase::Ready).await;
            session.touch().await;

            if let Err(e) = &result {
                tracing::warn!(session_id = %session.id, agent_id = %handles.agent_id, "Dispatch failed: {}", e);
            }
            result
        });

        let result = task
            .await
            .map_err(|e| SessionError::Interrupted(e.to_string()))?;
        Ok(result?)
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new());
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        tracing::debug!(session_id = %session.id, "Created session");
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        session.touch().await;
        Some(session)
    }

    /// Look up `id`, or start a fresh session when it is absent or unknown.
    ///
    /// Returns the session and whether it was newly created. Unknown ids are
    /// never adopted; the new session gets its own id.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Arc<Session>, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id).await {
                return (session, false);
            }
        }
        (self.create().await, true)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for at least `max_idle`. Returns how many were dropped.
    ///
    /// Sessions with platform work in flight are kept regardless of age.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut stale = Vec::new();
        for (id, session) in sessions.iter() {
            if session.is_busy().await {
                continue;
            }
            if session.last_seen.read().await.elapsed() >= max_idle {
                stale.push(*id);
            }
        }
        for id in &stale {
            sessions.remove(id);
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakePlatform;
    use crate::platform::AgentId;

    fn dispatcher_for(platform: &Arc<FakePlatform>) -> Dispatcher {
        Dispatcher::new(platform.clone(), "default_user")
    }

    #[tokio::test]
    async fn bootstraps_once_across_exchanges() {
        let platform = Arc::new(FakePlatform::default());
        let dispatcher = dispatcher_for(&platform);
        let store = SessionStore::new();
        let session = store.create().await;

        assert_eq!(session.phase().await, SessionPhase::Uninitialized);

        session.generate(&dispatcher, "AI in healthcare").await.unwrap();
        session.generate(&dispatcher, "Quantum computing").await.unwrap();

        assert_eq!(platform.environment_calls(), 1);
        assert_eq!(platform.agent_calls(), 1);
        let sent = platform.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.agent_id == AgentId("agent-1".into())));
        assert!(sent.iter().all(|m| m.session_id == session.id().to_string()));
        assert_eq!(session.phase().await, SessionPhase::Ready);
    }

    #[tokio::test]
    async fn handles_are_stable_within_a_session() {
        let platform = Arc::new(FakePlatform::default());
        let dispatcher = dispatcher_for(&platform);
        let session = SessionStore::new().create().await;

        let first = session.ensure_bootstrapped(&dispatcher).await.unwrap();
        let second = session.ensure_bootstrapped(&dispatcher).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(session.handles(), Some(&first));
    }

    #[tokio::test]
    async fn concurrent_first_requests_share_one_bootstrap() {
        let platform = Arc::new(FakePlatform::default());
        let dispatcher = dispatcher_for(&platform);
        let session = SessionStore::new().create().await;

        let (a, b, c) = tokio::join!(
            session.ensure_bootstrapped(&dispatcher),
            session.ensure_bootstrapped(&dispatcher),
            session.ensure_bootstrapped(&dispatcher),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert!(c.is_ok());
        assert_eq!(platform.environment_calls(), 1);
    }

    #[tokio::test]
    async fn sessions_bootstrap_independently() {
        let platform = Arc::new(FakePlatform::default());
        let dispatcher = dispatcher_for(&platform);
        let store = SessionStore::new();

        let one = store.create().await.ensure_bootstrapped(&dispatcher).await.unwrap();
        let two = store.create().await.ensure_bootstrapped(&dispatcher).await.unwrap();

        assert_ne!(one.agent_id, two.agent_id);
        assert_eq!(platform.environment_calls(), 2);
    }

    #[tokio::test]
    async fn blank_topic_makes_no_platform_calls() {
        let platform = Arc::new(FakePlatform::default());
        let dispatcher = dispatcher_for(&platform);
        let session = SessionStore::new().create().await;

        let err = session.generate(&dispatcher, "   ").await.unwrap_err();

        assert!(matches!(err, SessionError::Dispatch(DispatchError::EmptyTopic)));
        assert_eq!(platform.environment_calls(), 0);
        assert!(platform.sent().is_empty());
        assert_eq!(session.phase().await, SessionPhase::Uninitialized);
    }

    #[tokio::test]
    async fn failed_bootstrap_is_not_retried() {
        let platform = Arc::new(FakePlatform::failing_environment());
        let dispatcher = dispatcher_for(&platform);
        let session = SessionStore::new().create().await;

        let first = session.generate(&dispatcher, "topic").await.unwrap_err();
        let second = session.generate(&dispatcher, "topic").await.unwrap_err();

        assert!(matches!(first, SessionError::BootstrapFailed(_)));
        assert!(matches!(second, SessionError::BootstrapFailed(_)));
        assert_eq!(platform.environment_calls(), 1);
        assert!(platform.sent().is_empty());
        assert_eq!(session.phase().await, SessionPhase::Failed);
        assert!(session.handles().is_none());
    }

    #[tokio::test]
    async fn dispatch_failure_returns_to_ready() {
        let platform = Arc::new(FakePlatform::default());
        let dispatcher = dispatcher_for(&platform);
        let session = SessionStore::new().create().await;

        platform.set_fail_messages(true);
        let err = session.generate(&dispatcher, "topic").await.unwrap_err();
        assert!(matches!(err, SessionError::Dispatch(DispatchError::Platform(_))));
        assert_eq!(session.phase().await, SessionPhase::Ready);

        platform.set_fail_messages(false);
        let exchange = session.generate(&dispatcher, "topic").await.unwrap();
        assert_eq!(exchange.newsletter, "Newsletter about topic");
        assert_eq!(platform.environment_calls(), 1);
    }

    #[tokio::test]
    async fn dropped_bootstrap_still_completes_once() {
        let platform = Arc::new(FakePlatform::slow(Duration::from_millis(100)));
        let dispatcher = dispatcher_for(&platform);
        let session = SessionStore::new().create().await;

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), session.generate(&dispatcher, "topic")).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(session.phase().await, SessionPhase::Ready);
        assert!(session.handles().is_some());

        session.generate(&dispatcher, "topic").await.unwrap();
        assert_eq!(platform.environment_calls(), 1);
        assert_eq!(platform.agent_calls(), 1);
    }

    #[tokio::test]
    async fn dropped_dispatch_returns_to_ready() {
        let platform = Arc::new(FakePlatform::slow(Duration::from_millis(100)));
        let dispatcher = dispatcher_for(&platform);
        let session = SessionStore::new().create().await;
        session.ensure_bootstrapped(&dispatcher).await.unwrap();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), session.generate(&dispatcher, "topic")).await;
        assert!(abandoned.is_err());
        assert_eq!(session.phase().await, SessionPhase::Dispatching);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(session.phase().await, SessionPhase::Ready);
        assert_eq!(platform.sent().len(), 1);
    }

    #[tokio::test]
    async fn overlapping_dispatches_run_in_turn() {
        let platform = Arc::new(FakePlatform::slow(Duration::from_millis(200)));
        let dispatcher = dispatcher_for(&platform);
        let session = SessionStore::new().create().await;
        session.ensure_bootstrapped(&dispatcher).await.unwrap();

        let first = {
            let (session, dispatcher) = (session.clone(), dispatcher.clone());
            tokio::spawn(async move { session.generate(&dispatcher, "first").await })
        };
        let second = {
            let (session, dispatcher) = (session.clone(), dispatcher.clone());
            tokio::spawn(async move { session.generate(&dispatcher, "second").await })
        };

        // One reply is back, the other is still with the platform.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(platform.sent().len(), 1);
        assert_eq!(session.phase().await, SessionPhase::Dispatching);

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(platform.sent().len(), 2);
        assert_eq!(session.phase().await, SessionPhase::Ready);
    }

    #[tokio::test]
    async fn prune_keeps_sessions_with_work_in_flight() {
        let platform = Arc::new(FakePlatform::slow(Duration::from_millis(100)));
        let dispatcher = dispatcher_for(&platform);
        let store = SessionStore::new();
        let session = store.create().await;
        session.ensure_bootstrapped(&dispatcher).await.unwrap();

        let pending = {
            let (session, dispatcher) = (session.clone(), dispatcher.clone());
            tokio::spawn(async move { session.generate(&dispatcher, "topic").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.prune_idle(Duration::ZERO).await, 0);
        pending.await.unwrap().unwrap();
        assert_eq!(store.prune_idle(Duration::ZERO).await, 1);
    }

    #[tokio::test]
    async fn unknown_ids_get_a_fresh_session() {
        let store = SessionStore::new();
        let stranger = Uuid::new_v4();

        let (session, created) = store.get_or_create(Some(stranger)).await;
        assert!(created);
        assert_ne!(session.id(), stranger);

        let (again, created) = store.get_or_create(Some(session.id())).await;
        assert!(!created);
        assert_eq!(again.id(), session.id());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn prune_drops_only_idle_sessions() {
        let store = SessionStore::new();
        store.create().await;
        store.create().await;

        assert_eq!(store.prune_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.prune_idle(Duration::ZERO).await, 2);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn remove_forgets_session() {
        let store = SessionStore::new();
        let session = store.create().await;

        assert!(store.remove(session.id()).await);
        assert!(!store.remove(session.id()).await);
        assert!(store.get(session.id()).await.is_none());
    }
}
