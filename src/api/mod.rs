//! HTTP API and page for the newsletter generator.
//!
//! ## Endpoints
//!
//! - `GET /` - Newsletter form
//! - `POST /generate` - Form submission; renders the newsletter or a notice
//! - `POST /session/reset` - Start over with a fresh session
//! - `GET /static/logo.svg` - Logo
//! - `POST /api/newsletter` - JSON generation endpoint
//! - `GET /api/session` - Current session phase and handles
//! - `GET /api/health` - Health check

mod cookie;
mod newsletter;
mod page;
mod routes;
pub mod types;

pub use cookie::{CurrentSession, ExistingSession, SESSION_COOKIE};
pub use page::{render_markdown, render_page, Outcome, PageView};
pub use routes::{router, serve, AppState};
