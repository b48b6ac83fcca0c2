// gemgate - Rate-limited, caching gateway to the Google Generative Language API

use anyhow::Result;
use clap::Parser;
use gemgate::cache::ResponseCache;
use gemgate::cli::Args;
use gemgate::config::AppConfig;
use gemgate::faultlog::FaultLog;
use gemgate::gemini::GeminiClient;
use gemgate::limiter::RateLimiter;
use gemgate::server::create_router;
use gemgate::tasks::TaskGateway;
use gemgate::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let config = AppConfig::load(args.config.as_deref())?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting gemgate v{}", env!("CARGO_PKG_VERSION"));

    if config.gemini.api_key.as_deref().map_or(true, str::is_empty) {
        warn!("No API key configured; upstream dispatches will fail until one is set");
    }

    // Phase 3: Assemble the gateway services
    let fault_log = Arc::new(FaultLog::new(&config.gemini.error_log_path));
    let client = Arc::new(GeminiClient::new(&config.gemini, fault_log.clone())?);
    let limiter = RateLimiter::new(
        Duration::from_secs(config.rate_limit.window_seconds),
        config.rate_limit.max_requests,
    );
    let cache = ResponseCache::new(config.cache.capacity);
    let gateway = Arc::new(TaskGateway::new(client, cache, limiter, fault_log));

    // Phase 4: Build and start HTTP server
    let app = create_router(config.clone(), gateway);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 5: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
