//! Session cookie handling.

use std::convert::Infallible;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap, HeaderName};
use axum::response::AppendHeaders;
use uuid::Uuid;

use super::routes::AppState;
use crate::session::Session;

pub const SESSION_COOKIE: &str = "newsletter_session";

/// Session id carried by the request's cookies, if any parses.
pub(crate) fn session_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub(crate) fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// The caller's session, created if the request carries none.
pub struct CurrentSession {
    pub session: Arc<Session>,
    pub created: bool,
}

impl CurrentSession {
    /// `Set-Cookie` header for new sessions; nothing for existing ones.
    pub fn set_cookie(&self) -> AppendHeaders<Option<(HeaderName, String)>> {
        AppendHeaders(
            self.created
                .then(|| (header::SET_COOKIE, session_cookie(self.session.id()))),
        )
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (session, created) = state
            .sessions
            .get_or_create(session_id_from(&parts.headers))
            .await;
        Ok(Self { session, created })
    }
}

/// The caller's session if the cookie names a live one. Never creates.
pub struct ExistingSession(pub Option<Arc<Session>>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ExistingSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = match session_id_from(&parts.headers) {
            Some(id) => state.sessions.get(id).await,
            None => None,
        };
        Ok(Self(session))
    }
}
