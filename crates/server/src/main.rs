use std::sync::Arc;

use server::config;
use server::routes;
use server::SharedAnalyst;

use axum::{routing::{get, post}, Extension, Router};
use commentator::engine::ManagedEngine;
use commentator::gemini::GeminiClient;
use commentator::live::Analyst;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;

    // One engine for every live connection, started before we accept any
    tracing::info!(path = %config.commentary.stockfish_path, "Starting Stockfish...");
    let engine = ManagedEngine::start(config.commentary.engine_options()).await?;
    let model = GeminiClient::new(&config.commentary)?;
    tracing::info!(model = %config.commentary.gemini_model, "Gemini client ready");

    let analyst: SharedAnalyst = Arc::new(Analyst::new(
        engine,
        model,
        config.commentary.search_limit(),
    ));

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Live analysis
        .route("/ws", get(routes::analysis_ws::ws_handler))
        // Batch analysis
        .route("/api/games/analyze", post(routes::games::analyze_game))
        // Shared state
        .layer(Extension(analyst.clone()))
        .layer(Extension(config.clone()))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down Stockfish");
    analyst.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
