//! Newsletter Agent - HTTP Server Entry Point
//!
//! Starts the HTTP server that serves the newsletter form.

use newsletter_agent::{api, config};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    let dotenv = config::load_dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsletter_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenv {
        Ok(Some(path)) => info!("Loaded environment from {}", path.display()),
        Ok(None) => debug!("No .env file found"),
        Err(e) => warn!("Ignoring unreadable .env: {}", e),
    }

    // Load configuration
    let config = config::Config::from_env()?;
    info!(
        "Loaded configuration: platform={}, user_id={}",
        config.base_url, config.user_id
    );

    api::serve(config).await?;

    Ok(())
}
