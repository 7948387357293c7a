use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pimang::backend::{Backend, MemoryBackend, RestBackend};
use pimang::config::{Cli, Config};
use pimang::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    let backend: Arc<dyn Backend> = if config.backend.in_memory {
        tracing::warn!("Using the in-memory backend; nothing is persisted");
        Arc::new(MemoryBackend::new())
    } else {
        tracing::info!("Backend: {}", config.backend.url);
        Arc::new(RestBackend::new(
            &config.backend.url,
            &config.backend.anon_key,
            Duration::from_secs(config.backend.timeout_secs),
        )?)
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = pimang::app(AppState::new(backend, config));

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
