//! Newsletter generation on top of the hosted agent platform.
//!
//! 1. `bootstrap` provisions an environment (tool calling, short-term
//!    memory, search tool) and an agent with the newsletter prompt
//! 2. `Dispatcher` sends each submitted topic to that agent and returns
//!    the generated text

mod bootstrap;
mod dispatch;
mod prompt;

pub use bootstrap::{bootstrap, AgentHandles};
pub use dispatch::{validate_topic, DispatchError, Dispatcher, Exchange};
pub use prompt::{environment_spec, AGENT_NAME, ENVIRONMENT_NAME, SEARCH_TOOL, SYSTEM_PROMPT};

/// Shown when a blank topic is submitted.
pub const EMPTY_TOPIC_WARNING: &str = "Please provide Topic";

/// Label placed above every generated newsletter.
pub const OUTPUT_LABEL: &str = "Generated NewsLetter:";

/// Shown when the platform call for a topic fails.
pub const GENERATION_FAILED: &str = "Failed to generate newsletter. Please try again.";

/// Shown when the session's agent could not be provisioned.
pub const BOOTSTRAP_FAILED: &str =
    "The newsletter agent could not be set up for this session. Start a new session to try again.";
