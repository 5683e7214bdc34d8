//! Server-rendered newsletter page.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect};
use axum::Form;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use serde::Deserialize;

use super::cookie::{session_cookie, session_id_from, CurrentSession};
use super::routes::AppState;
use crate::newsletter::{
    DispatchError, BOOTSTRAP_FAILED, EMPTY_TOPIC_WARNING, GENERATION_FAILED, OUTPUT_LABEL,
};
use crate::session::SessionError;

const TITLE: &str = "Lyzr Newsletter Generator";
const WELCOME: &str = "Welcome to the Lyzr Newsletter Generator!";
const INPUT_LABEL: &str = "Enter Topic and description";
const SUBMIT_LABEL: &str = "Generate NewsLetter";
const WAITING_LABEL: &str = "Generating NewsLetter...";
const FOOTER: &str = "Powered by Lyzr and OpenAI";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 730px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
textarea { width: 100%; height: 150px; box-sizing: border-box; padding: .5rem; font: inherit; }
button { margin-top: .75rem; padding: .5rem 1rem; font: inherit; cursor: pointer; }
button[disabled] { opacity: .6; cursor: wait; }
.notice { padding: .75rem 1rem; border-radius: .4rem; margin: 1rem 0; }
.warning { background: #fffce7; border: 1px solid #f0d000; }
.error { background: #ffecec; border: 1px solid #ff4b4b; }
#waiting { margin-top: .75rem; font-style: italic; }
footer { color: #808495; }
"#;

const SUBMIT_SCRIPT: &str = r#"
const form = document.getElementById('newsletter-form');
form.addEventListener('submit', () => {
  form.querySelector('button').disabled = true;
  document.getElementById('waiting').hidden = false;
});
window.addEventListener('pageshow', () => {
  form.querySelector('button').disabled = false;
  document.getElementById('waiting').hidden = true;
});
"#;

const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="150" height="60" viewBox="0 0 150 60">
<rect width="150" height="60" rx="10" fill="#6b2bd9"/>
<text x="75" y="40" font-family="Helvetica, Arial, sans-serif" font-size="30" font-weight="700" fill="#ffffff" text-anchor="middle">lyzr</text>
</svg>"##;

/// Result of a submission, as shown under the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Newsletter(String),
    Warning(&'static str),
    Error(&'static str),
}

#[derive(Debug, Clone, Default)]
pub struct PageView {
    /// Echoed back into the textarea
    pub topic: String,
    pub outcome: Option<Outcome>,
    /// The session is unusable and must be replaced
    pub offer_reset: bool,
}

impl From<Result<String, SessionError>> for PageView {
    fn from(result: Result<String, SessionError>) -> Self {
        match result {
            Ok(newsletter) => Self {
                outcome: Some(Outcome::Newsletter(newsletter)),
                ..Self::default()
            },
            Err(SessionError::Dispatch(DispatchError::EmptyTopic)) => Self {
                outcome: Some(Outcome::Warning(EMPTY_TOPIC_WARNING)),
                ..Self::default()
            },
            Err(SessionError::Dispatch(DispatchError::Platform(_)))
            | Err(SessionError::Interrupted(_)) => Self {
                outcome: Some(Outcome::Error(GENERATION_FAILED)),
                ..Self::default()
            },
            Err(SessionError::BootstrapFailed(_)) => Self {
                outcome: Some(Outcome::Error(BOOTSTRAP_FAILED)),
                offer_reset: true,
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub topic: String,
}

/// GET / - Render the empty form.
///
/// Sessions start with the first submission, not here.
pub async fn index() -> Html<String> {
    Html(render_page(&PageView::default()))
}

/// POST /generate - Generate a newsletter for the submitted topic.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Form(form): Form<GenerateForm>,
) -> impl IntoResponse {
    let result = session
        .session
        .generate(&state.dispatcher, &form.topic)
        .await
        .map(|exchange| exchange.newsletter);

    let mut view = PageView::from(result);
    view.topic = form.topic;

    (session.set_cookie(), Html(render_page(&view)))
}

/// POST /session/reset - Drop the current session and start a new one.
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(id) = session_id_from(&headers) {
        if state.sessions.remove(id).await {
            tracing::info!(session_id = %id, "Session reset");
        }
    }
    let fresh = state.sessions.create().await;
    (
        AppendHeaders([(header::SET_COOKIE, session_cookie(fresh.id()))]),
        Redirect::to("/"),
    )
}

/// GET /static/logo.svg
pub async fn logo() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], LOGO_SVG)
}

pub fn render_page(view: &PageView) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{TITLE}</title>\n"));
    out.push_str("<link rel=\"icon\" href=\"/static/logo.svg\" type=\"image/svg+xml\">\n");
    out.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

    out.push_str("<img src=\"/static/logo.svg\" alt=\"Lyzr\" width=\"150\">\n");
    out.push_str(&format!("<h1>{TITLE}</h1>\n<h3>{WELCOME}</h3>\n"));

    out.push_str("<form id=\"newsletter-form\" method=\"post\" action=\"/generate\">\n");
    out.push_str(&format!("<label for=\"topic\">{INPUT_LABEL}</label>\n"));
    out.push_str(&format!(
        "<textarea id=\"topic\" name=\"topic\">{}</textarea>\n",
        escape_html(&view.topic)
    ));
    out.push_str(&format!("<button type=\"submit\">{SUBMIT_LABEL}</button>\n"));
    out.push_str(&format!("<div id=\"waiting\" hidden>{WAITING_LABEL}</div>\n</form>\n"));

    match &view.outcome {
        Some(Outcome::Newsletter(text)) => {
            out.push_str("<section id=\"newsletter\">\n");
            out.push_str(&format!("<p><strong>{OUTPUT_LABEL}</strong></p>\n"));
            out.push_str(&render_markdown(text));
            out.push_str("</section>\n");
        }
        Some(Outcome::Warning(message)) => {
            out.push_str(&format!(
                "<div class=\"notice warning\" role=\"alert\">{}</div>\n",
                escape_html(message)
            ));
        }
        Some(Outcome::Error(message)) => {
            out.push_str(&format!(
                "<div class=\"notice error\" role=\"alert\">{}</div>\n",
                escape_html(message)
            ));
        }
        None => {}
    }

    if view.offer_reset {
        out.push_str(
            "<form method=\"post\" action=\"/session/reset\"><button type=\"submit\">Start new session</button></form>\n",
        );
    }

    out.push_str(&format!("<hr>\n<footer>{FOOTER}</footer>\n"));
    out.push_str(&format!("<script>{SUBMIT_SCRIPT}</script>\n</body>\n</html>\n"));
    out
}

/// Render agent markdown to HTML.
///
/// Raw HTML in the source is shown as text, and links or images with
/// non-web schemes are neutralised.
pub fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lower = url.trim().to_ascii_lowercase();
    let has_scheme = lower
        .split_once(':')
        .map(|(scheme, _)| !scheme.contains('/') && !scheme.contains('?') && !scheme.contains('#'))
        .unwrap_or(false);

    if !has_scheme
        || lower.starts_with("http:")
        || lower.starts_with("https:")
        || lower.starts_with("mailto:")
    {
        url
    } else {
        CowStr::Borrowed("#")
    }
}

/// Basic HTML escaping for text and attribute content.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
