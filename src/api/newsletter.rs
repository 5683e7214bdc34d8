//! JSON endpoints for programmatic callers.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::cookie::{CurrentSession, ExistingSession};
use super::routes::AppState;
use super::types::{ApiError, NewsletterRequest, NewsletterResponse, SessionInfo};

/// POST /api/newsletter - Generate a newsletter for a topic.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Json(req): Json<NewsletterRequest>,
) -> Response {
    let body = match session.session.generate(&state.dispatcher, &req.topic).await {
        Ok(exchange) => Json(NewsletterResponse {
            session_id: session.session.id(),
            topic: exchange.topic,
            newsletter: exchange.newsletter,
            generated_at: exchange.generated_at,
        })
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    };

    // New sessions keep their cookie even when the exchange failed.
    (session.set_cookie(), body).into_response()
}

/// GET /api/session - Phase and handles of the caller's session.
pub async fn session_info(
    ExistingSession(session): ExistingSession,
) -> Result<Json<SessionInfo>, ApiError> {
    let session = session.ok_or_else(|| ApiError::NotFound("No active session".to_string()))?;
    Ok(Json(SessionInfo {
        id: session.id(),
        phase: session.phase().await,
        created_at: session.created_at(),
        handles: session.handles().cloned(),
    }))
}
