use serde::{Deserialize, Serialize};

use crate::guard::judge::GuardConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Datastore sidecar configuration
    pub store: StoreConfig,
    /// Hallucination guard policy
    pub guard: GuardConfig,
    /// Number of reranked candidates projected into the grounding context
    pub context_k: usize,
    /// Maximum concurrent narrative generations
    pub max_concurrent_summaries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for summary generation
    pub chat_model: String,
    /// Model name for query embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Embedding vector dimension
    pub embedding_dim: usize,
}

/// Configuration for the datastore sidecar executing the actual vector,
/// full-text, and geospatial queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the datastore search API
    pub base_url: String,
    /// Request timeout in seconds (capped at 30)
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9100".to_string(),
            llm: LlmConfig::default(),
            store: StoreConfig::default(),
            guard: GuardConfig::default(),
            context_k: crate::search::context::DEFAULT_CONTEXT_K,
            max_concurrent_summaries: 3,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            api_key: None,
            embedding_dim: 384,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9200".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("PROP_INTEL_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(dim) = std::env::var("LLM_EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.llm.embedding_dim = d;
            }
        }
        if let Ok(url) = std::env::var("PROP_INTEL_STORE_URL") {
            config.store.base_url = url;
        }
        if let Ok(val) = std::env::var("PROP_INTEL_STORE_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.store.timeout_secs = v.min(30); // Cap at 30s
            }
        }
        if let Ok(val) = std::env::var("PROP_INTEL_CONTEXT_K") {
            if let Ok(v) = val.parse::<usize>() {
                if v > 0 {
                    config.context_k = v;
                }
            }
        }
        if let Ok(val) = std::env::var("PROP_INTEL_MAX_CONCURRENT_SUMMARIES") {
            if let Ok(v) = val.parse() {
                config.max_concurrent_summaries = v;
            }
        }
        if let Ok(val) = std::env::var("GUARD_ABS_TOLERANCE") {
            if let Ok(v) = val.parse() {
                config.guard.abs_tolerance = v;
            }
        }
        if let Ok(val) = std::env::var("GUARD_REL_TOLERANCE") {
            if let Ok(v) = val.parse() {
                config.guard.rel_tolerance = v;
            }
        }
        if let Ok(val) = std::env::var("GUARD_MAX_SCAN_CHARS") {
            if let Ok(v) = val.parse() {
                config.guard.max_scan_chars = v;
            }
        }

        config
    }
}
