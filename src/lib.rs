//! # Newsletter Agent
//!
//! A small web front-end that turns a topic into a newsletter using a hosted
//! Lyzr agent.
//!
//! This library provides:
//! - A client for the Lyzr agent platform (environments, agents, messages)
//! - Per-session bootstrap of a newsletter-writing agent
//! - An HTTP server with a form page and a JSON API
//!
//! ## Flow
//!
//! 1. A browser session is identified by a cookie
//! 2. On the first submitted topic the session provisions an environment
//!    (tool calling, short-term memory, search tool) and an agent
//! 3. Each topic is sent to that agent; the reply is rendered verbatim
//!
//! ## Example
//!
//! ```rust,ignore
//! use newsletter_agent::{api, config::Config};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod api;
pub mod config;
pub mod newsletter;
pub mod platform;
pub mod session;

pub use config::Config;
