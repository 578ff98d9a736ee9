//! TransNative - Chinese to natural English translation service
//!
//! Serves:
//! - POST /translate (3-5 English options per input)
//! - GET /health
//! - the static web front end

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use transnative::{config, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let dotenv_loaded = std::path::Path::new(".env").exists();
    if dotenv_loaded {
        dotenvy::dotenv()?;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("TransNative starting...");
    if dotenv_loaded {
        info!("Loaded environment variables from .env file");
    }

    let config = config::Config::load()?;
    info!("Configuration loaded");
    info!("Completion endpoint: {}", config.completion.endpoint);
    info!("Completion model: {}", config.completion.model);
    if let Some(ref fallback) = config.completion.fallback_model {
        info!("Fallback model: {}", fallback);
    }
    info!("API key: {}", if config.completion.api_key.is_empty() { "EMPTY" } else { "SET" });
    if config.completion.api_key.is_empty() {
        warn!("No API key configured; requests will be sent without authorization");
    }

    server::serve(config).await?;

    info!("TransNative shutting down");
    Ok(())
}
