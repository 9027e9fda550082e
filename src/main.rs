use std::path::PathBuf;

mod ai;
mod app;
mod config;
mod error;
mod http;
mod models;
mod services;

use app::ChatService;
use config::Config;
use error::Result;
use http::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (info and above unless RUST_LOG says otherwise)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration, from --config <path> if given
    let config = if args.len() >= 3 && args[1] == "--config" {
        Config::load_from(&PathBuf::from(&args[2]))?
    } else {
        Config::load()?
    };
    let config = config.with_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;

    if !config.gemini_configured() {
        tracing::warn!("GEMINI_API_KEY is not set, /api/generate will answer with 500");
    }
    if !config.gnews_configured() {
        tracing::warn!("GNEWS_API_KEY is not set, news lookups will be skipped");
    }

    let chat = ChatService::new(&config)?;
    let app = create_router(AppState::new(chat), config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        "kabar-chat v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        config.bind_addr
    );
    axum::serve(listener, app).await?;

    Ok(())
}
