// API Server Binary Entry Point
//
// Purpose: Start the Axum server for the recommendation and production tools
// Usage: cargo run --bin api_server

use crop_advisor::{create_router, AppState, ServerConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "crop_advisor=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = ServerConfig::from_env();

    tracing::info!("Configuration:");
    tracing::info!("  RECOMMENDATION_MODEL_PATH: {:?}", config.recommendation_model_path);
    tracing::info!("  PRODUCTION_MODEL_PATH: {:?}", config.production_model_path);
    tracing::info!("  PORT: {}", config.port);

    // Models that fail to load disable their tool; the server still starts
    let state = AppState::load(&config);
    if !state.recommendation_model.is_ready() && !state.production_model.is_ready() {
        tracing::warn!("No models loaded; both tools will report the model as unavailable");
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await?;

    Ok(())
}
