use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::models::{Property, QueryRequest};

/// Filters shipped to the datastore sidecar. The sidecar owns the actual
/// vector, full-text, and geospatial execution; this crate only speaks its
/// wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct SearchFilters {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub radius_km: f64,
    pub limit: usize,
    pub offset: usize,
    /// Query embedding; absent when the embedding call failed or is
    /// disabled, in which case the sidecar skips the vector ranking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_vector: Option<Vec<f32>>,
}

impl SearchFilters {
    /// Fetch headroom for the reranker: five times the requested page,
    /// capped at 100 (the sidecar enforces the same cap).
    pub fn from_request(req: &QueryRequest, query_vector: Option<Vec<f32>>) -> Self {
        Self {
            query: req.query.trim().to_string(),
            city: req.city.clone(),
            locality: req.locality.clone(),
            property_type: req.property_type.clone(),
            min_price: req.min_price,
            max_price: req.max_price,
            bedrooms: req.bedrooms,
            lat: req.lat,
            lng: req.lng,
            radius_km: req.radius_km,
            limit: (req.limit * 5).min(100),
            offset: req.offset,
            query_vector,
        }
    }
}

/// Ranked ID lists plus full records for one search. The three lists are
/// independently ordered by their own relevance measure and feed straight
/// into RRF fusion.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchOutcome {
    pub vector_ids: Vec<Uuid>,
    pub keyword_ids: Vec<Uuid>,
    pub spatial_ids: Vec<Uuid>,
    pub records: Vec<Property>,
    pub total_count: u64,
}

/// HTTP client for the datastore sidecar.
#[derive(Clone)]
pub struct DatastoreClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl DatastoreClient {
    pub fn new(config: &StoreConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            client,
        }
    }

    /// Execute one hybrid search. The sidecar runs the three retrieval
    /// modalities concurrently and responds once all have completed or
    /// timed out, so fusion can run immediately on the result.
    pub async fn search(&self, filters: &SearchFilters) -> Result<SearchOutcome> {
        let url = format!("{}/search", self.base_url);

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(filters)
            .send()
            .await
            .context("Failed to call datastore search API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Datastore search API returned {status}: {body}");
        }

        resp.json()
            .await
            .context("Failed to parse datastore search response")
    }

    /// Readiness probe; false on any transport or status failure.
    pub async fn is_reachable(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: &str, limit: usize) -> QueryRequest {
        serde_json::from_value(serde_json::json!({"query": query, "limit": limit})).unwrap()
    }

    #[test]
    fn test_filters_fetch_headroom() {
        let filters = SearchFilters::from_request(&request("2 bhk", 10), None);
        assert_eq!(filters.limit, 50);
        let capped = SearchFilters::from_request(&request("2 bhk", 40), None);
        assert_eq!(capped.limit, 100);
    }

    #[test]
    fn test_filters_omit_absent_fields() {
        let filters = SearchFilters::from_request(&request(" 2 bhk ", 10), None);
        let json = serde_json::to_value(&filters).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["query"], "2 bhk");
        assert!(!obj.contains_key("city"));
        assert!(!obj.contains_key("query_vector"));
    }

    #[test]
    fn test_filters_carry_vector() {
        let filters = SearchFilters::from_request(&request("2 bhk", 10), Some(vec![0.1, 0.2]));
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["query_vector"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_outcome_deserializes() {
        let json = serde_json::json!({
            "vector_ids": [],
            "keyword_ids": ["6f2b9c52-6a01-4a52-8a7a-62b9e36a3c11"],
            "spatial_ids": [],
            "records": [],
            "total_count": 1,
        });
        let outcome: SearchOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(outcome.keyword_ids.len(), 1);
        assert_eq!(outcome.total_count, 1);
    }
}
