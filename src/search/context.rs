use serde::Serialize;
use uuid::Uuid;

use crate::models::Property;

/// Number of candidates projected into the grounding context by default.
pub const DEFAULT_CONTEXT_K: usize = 5;

/// A lean, null-free projection of a reranked candidate, safe to serialize
/// into a generation prompt. Only fields grounded in the datastore are
/// carried; optional fields vanish from the JSON when absent.
#[derive(Debug, Clone, Serialize)]
pub struct ContextRecord {
    pub property_id: Uuid,
    pub title: String,
    pub locality: String,
    pub city: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_sqft: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carpet_area_sqft: Option<f64>,
    pub property_type: String,
    pub listing_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rera_id: Option<String>,
    pub is_verified: bool,
    pub score: f64,
}

/// Project the first `k` reranked candidates into grounding records.
pub fn extract_top_k(properties: &[Property], k: usize) -> Vec<ContextRecord> {
    properties
        .iter()
        .take(k)
        .map(|p| ContextRecord {
            property_id: p.id,
            title: p.title.clone(),
            locality: p.locality.clone(),
            city: p.city.clone(),
            price: p.price,
            price_per_sqft: p.price_per_sqft,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            carpet_area_sqft: p.carpet_area_sqft,
            property_type: p.property_type.clone(),
            listing_type: p.listing_type.clone(),
            status: p.status.clone(),
            builder_name: p.builder_name.clone(),
            project_name: p.project_name.clone(),
            rera_id: p.rera_id.clone(),
            is_verified: p.is_verified,
            score: p.score,
        })
        .collect()
}
