use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::guard::judge::{Action, Verdict, VerdictKind};

/// A property listing as returned by the datastore sidecar.
///
/// `score` starts as the datastore's combined score, is overwritten by the
/// RRF fused score, and finally by the feature reranker. Unbounded columns
/// (images, amenities, price history) are never part of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub property_type: String,
    pub listing_type: String,
    pub status: String,
    pub price: f64,
    pub price_per_sqft: Option<f64>,
    pub carpet_area_sqft: Option<f64>,
    pub built_up_area_sqft: Option<f64>,
    pub locality: String,
    pub city: String,
    pub pincode: Option<String>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub builder_name: Option<String>,
    pub project_name: Option<String>,
    pub rera_id: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub listed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: f64,
}

/// Query request
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_radius_km() -> f64 {
    5.0
}

fn default_limit() -> usize {
    10
}

/// Query response
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub request_id: Uuid,
    pub properties: Vec<Property>,
    pub total_results: u64,
    pub ai_summary: Option<String>,
    pub ai_verified: bool,
    pub verification: Option<VerificationSummary>,
    pub retrieval_method: String,
    pub latency_ms: f64,
    pub metadata: QueryMetadata,
}

/// Compact verification result attached to a query response.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationSummary {
    pub verdict: VerdictKind,
    pub action: Action,
    pub total_claims: usize,
    pub verified_claims: usize,
    pub unverified_claims: usize,
    pub confidence: f64,
}

impl From<&Verdict> for VerificationSummary {
    fn from(verdict: &Verdict) -> Self {
        Self {
            verdict: verdict.verdict,
            action: verdict.action,
            total_claims: verdict.total_claims,
            verified_claims: verdict.verified_claims,
            unverified_claims: verdict.unverified_claims,
            confidence: verdict.confidence,
        }
    }
}

/// Per-stage candidate counts for a single query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryMetadata {
    pub vector_search_active: bool,
    pub vector_candidates: usize,
    pub keyword_candidates: usize,
    pub spatial_candidates: usize,
    pub fused_candidates: usize,
    pub reranked_to: usize,
}

/// Health response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub datastore_reachable: bool,
    pub llm_provider: String,
    pub uptime_seconds: f64,
}

/// LLM config update request
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfigUpdate {
    pub provider: Option<String>,
    // base_url intentionally omitted: immutable at runtime to prevent SSRF
    pub chat_model: Option<String>,
    pub embedding_model: Option<String>,
    pub api_key: Option<String>,
    pub embedding_dim: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_defaults() {
        let req: QueryRequest = serde_json::from_str(r#"{"query": "2 bhk in adyar"}"#).unwrap();
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset, 0);
        assert!((req.radius_km - 5.0).abs() < f64::EPSILON);
        assert!(req.city.is_none());
    }

    #[test]
    fn test_property_deserializes_without_flags() {
        let json = r#"{
            "id": "6f2b9c52-6a01-4a52-8a7a-62b9e36a3c11",
            "title": "Adyar Villa",
            "property_type": "villa",
            "listing_type": "sale",
            "status": "active",
            "price": 15501.0,
            "locality": "Adyar",
            "city": "Chennai"
        }"#;
        let prop: Property = serde_json::from_str(json).unwrap();
        assert!(!prop.is_verified);
        assert!(!prop.is_featured);
        assert_eq!(prop.score, 0.0);
        assert!(prop.bedrooms.is_none());
    }
}
