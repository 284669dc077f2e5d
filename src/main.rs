//! `CogniBot` - a small chat assistant served over HTTP
//!
//! Each browser session holds a bounded conversation that is forwarded to an
//! OpenAI-compatible completion endpoint.

mod api;
mod config;
mod conversation;
mod llm;
mod runtime;
mod session;

use api::{create_router, AppState};
use config::ServerConfig;
use llm::{CompletionClient, CompletionConfig, LoggingClient, OpenRouterClient};
use runtime::SessionManager;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cognibot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let server_config = ServerConfig::from_env();
    let completion_config = CompletionConfig::from_env();

    if !completion_config.has_api_key() {
        tracing::warn!(
            "No completion API key configured. Set OPENROUTER_API_KEY; requests will be sent unauthenticated."
        );
    }

    let provider = OpenRouterClient::new(&completion_config)?;
    let client: Arc<dyn CompletionClient> = Arc::new(LoggingClient::new(Arc::new(provider)));
    tracing::info!(
        model = %client.model_id(),
        url = %completion_config.api_url,
        "Completion client initialized"
    );

    // Create application state
    let state = AppState::new(SessionManager::new(client));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = server_config.addr();
    tracing::info!("CogniBot server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
