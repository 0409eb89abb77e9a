use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::config::LlmConfig;
use crate::metrics::MetricsSnapshot;
use crate::models::{HealthResponse, LlmConfigUpdate};
use crate::state::AppState;

/// GET /api/health — readiness check. Degrades (rather than fails) when
/// the datastore sidecar is unreachable; do not wire this as a liveness
/// probe, a slow sidecar would kill healthy containers.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let datastore_reachable = state.store.is_reachable().await;
    let llm_provider = state.llm_config.read().provider.clone();

    Json(HealthResponse {
        status: if datastore_reachable {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        datastore_reachable,
        llm_provider,
        uptime_seconds: state.metrics.uptime_seconds(),
    })
}

/// GET /api/metrics — aggregate counters. Safe to poll, touches no
/// external service.
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// GET /api/config — current runtime LLM configuration (API key omitted).
pub async fn get_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.llm_config.read().clone();
    Json(serde_json::json!({
        "provider": config.provider,
        "base_url": config.base_url,
        "chat_model": config.chat_model,
        "embedding_model": config.embedding_model,
        "embedding_dim": config.embedding_dim,
        "has_api_key": config.api_key.is_some(),
    }))
}

/// PUT /api/config — update runtime LLM settings. The base URL is
/// immutable at runtime.
pub async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<LlmConfigUpdate>,
) -> Json<serde_json::Value> {
    let mut config = state.llm_config.write();
    apply_update(&mut config, update);

    Json(serde_json::json!({ "updated": true }))
}

fn apply_update(config: &mut LlmConfig, update: LlmConfigUpdate) {
    if let Some(provider) = update.provider {
        config.provider = provider;
    }
    if let Some(model) = update.chat_model {
        config.chat_model = model;
    }
    if let Some(model) = update.embedding_model {
        config.embedding_model = model;
    }
    if let Some(key) = update.api_key {
        config.api_key = Some(key);
    }
    if let Some(dim) = update.embedding_dim {
        config.embedding_dim = dim;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_update_changes_only_given_fields() {
        let mut config = LlmConfig::default();
        let original_url = config.base_url.clone();
        apply_update(
            &mut config,
            LlmConfigUpdate {
                provider: Some("openai".to_string()),
                chat_model: None,
                embedding_model: None,
                api_key: Some("sk-test".to_string()),
                embedding_dim: None,
            },
        );
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url, original_url);
        assert_eq!(config.chat_model, LlmConfig::default().chat_model);
    }
}
