//! API request and response types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::newsletter::{
    AgentHandles, DispatchError, BOOTSTRAP_FAILED, EMPTY_TOPIC_WARNING, GENERATION_FAILED,
};
use crate::session::{SessionError, SessionPhase};

/// Request to generate a newsletter.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsletterRequest {
    /// Topic and optional description
    #[serde(default)]
    pub topic: String,
}

/// A generated newsletter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterResponse {
    pub session_id: Uuid,
    pub topic: String,
    /// Generated text, verbatim from the agent
    pub newsletter: String,
    pub generated_at: DateTime<Utc>,
}

/// Current session state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub phase: SessionPhase,
    pub created_at: DateTime<Utc>,
    /// Present once bootstrap has succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handles: Option<AgentHandles>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors returned by the JSON API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Dispatch(DispatchError::EmptyTopic) => {
                Self::BadRequest(EMPTY_TOPIC_WARNING.to_string())
            }
            SessionError::Dispatch(DispatchError::Platform(_)) => {
                Self::BadGateway(GENERATION_FAILED.to_string())
            }
            SessionError::BootstrapFailed(_) => {
                Self::ServiceUnavailable(BOOTSTRAP_FAILED.to_string())
            }
            SessionError::Interrupted(_) => Self::Internal(GENERATION_FAILED.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
