use axum::routing::{get, post, put};
use axum::Router;
use tracing_subscriber::EnvFilter;

use prop_intel::api;
use prop_intel::config::Config;
use prop_intel::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Datastore sidecar: {}", config.store.base_url);
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.base_url);

    let state = AppState::new(config.clone())?;

    let app = Router::new()
        .route("/api/query", post(api::query::query))
        .route("/api/health", get(api::system::health))
        .route("/api/metrics", get(api::system::metrics))
        .route("/api/config", get(api::system::get_config))
        .route("/api/config", put(api::system::update_config))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
