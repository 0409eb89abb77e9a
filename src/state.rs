use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{Config, LlmConfig};
use crate::guard::HallucinationGuard;
use crate::metrics::Metrics;
use crate::store::DatastoreClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub llm_config: Arc<RwLock<LlmConfig>>,
    pub store: DatastoreClient,
    pub guard: Arc<HallucinationGuard>,
    pub metrics: Arc<Metrics>,
    pub summary_semaphore: Arc<tokio::sync::Semaphore>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let store = DatastoreClient::new(&config.store, http_client.clone());
        let guard = Arc::new(HallucinationGuard::new(config.guard.clone()));
        let llm_config = Arc::new(RwLock::new(config.llm.clone()));
        let max_concurrent_summaries = config.max_concurrent_summaries;

        Ok(Self {
            config,
            http_client,
            llm_config,
            store,
            guard,
            metrics: Arc::new(Metrics::new()),
            summary_semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent_summaries)),
        })
    }
}
