//! Router construction and server startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use super::types::HealthResponse;
use super::{newsletter, page};
use crate::config::Config;
use crate::newsletter::Dispatcher;
use crate::platform::{LyzrClient, PlatformClient};
use crate::session::SessionStore;

/// Upper bound on how often idle sessions are swept.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state.
pub struct AppState {
    pub sessions: SessionStore,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: &Config, platform: Arc<dyn PlatformClient>) -> Self {
        Self {
            sessions: SessionStore::new(),
            dispatcher: Dispatcher::new(platform, config.user_id.clone()),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/newsletter", post(newsletter::generate))
        .route("/session", get(newsletter::session_info))
        .route("/health", get(health));

    Router::new()
        .route("/", get(page::index))
        .route("/generate", post(page::generate))
        .route("/session/reset", post(page::reset_session))
        .route("/static/logo.svg", get(page::logo))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the platform client, then serve until the process exits.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let platform: Arc<dyn PlatformClient> = Arc::new(LyzrClient::new(&config)?);
    let state = Arc::new(AppState::new(&config, platform));

    spawn_session_pruner(state.sessions.clone(), config.session_idle_timeout);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn spawn_session_pruner(sessions: SessionStore, idle_timeout: Duration) {
    let period = idle_timeout.min(PRUNE_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let dropped = sessions.prune_idle(idle_timeout).await;
            if dropped > 0 {
                tracing::debug!(dropped, "Pruned idle sessions");
            }
        }
    });
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
