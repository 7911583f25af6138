//! EcoBot agent HTTP Server
//!
//! Axum-based server exposing the agent over REST, plus a WebSocket
//! placeholder for streamed responses.

mod config;
mod error;
mod handlers;
mod prompt;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_runtime::{ProviderFactory, ProviderSettings};
use agent_tools::{Toolbox, ToolsConfig};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before reading RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let providers = ProviderSettings::from_env();
    if providers.openai.api_key.is_some() {
        tracing::info!("✓ OpenAI configured");
    } else {
        tracing::warn!("⚠ OPENAI_API_KEY not set - gpt models and the default model will fail");
    }
    if providers.gemini.api_key.is_some() {
        tracing::info!("✓ Gemini configured");
    } else {
        tracing::warn!("⚠ GOOGLE_API_KEY not set - gemini models will fail");
    }

    let tools_config = ToolsConfig::from_env();
    tracing::info!(
        timeout_secs = tools_config.timeout_secs,
        max_search_results = tools_config.max_search_results,
        "Tool settings"
    );
    let toolbox = Toolbox::live(tools_config);

    let state = AppState::new(Arc::new(ProviderFactory::new(providers)), toolbox);
    let app = routes::app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🌿 EcoBot agent server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health         - Health check");
    tracing::info!("  POST /agent/generate - Run the agent on a conversation");
    tracing::info!("  GET  /agent/stream   - WebSocket (placeholder)");

    axum::serve(listener, app).await?;

    Ok(())
}
