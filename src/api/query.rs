use std::collections::HashMap;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::guard::judge::VerdictKind;
use crate::llm::embeddings::embed_query;
use crate::llm::narrative::generate_summary;
use crate::models::{
    Property, QueryMetadata, QueryRequest, QueryResponse, VerificationSummary,
};
use crate::search::context::extract_top_k;
use crate::search::fusion::reciprocal_rank_fusion;
use crate::search::rerank::cross_score;
use crate::state::AppState;
use crate::store::SearchFilters;

/// POST /api/query — full hybrid pipeline:
///   1. Embed the query (optional; failure degrades to keyword+spatial)
///   2. Datastore search → three ranked ID lists + records
///   3. RRF fusion across vector / keyword / spatial rankings
///   4. Feature-based re-ranking (budget, bedrooms, locality, trust)
///   5. Top-K grounding context extraction
///   6. Strict-evidence narrative generation
///   7. Hallucination guard: verify, then pass / flag / reject
pub async fn query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, String)> {
    let started = Instant::now();
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }
    let request_id = Uuid::new_v4();

    // ── Step 1: Query embedding (vector ranking is optional) ──
    let llm_config = state.llm_config.read().clone();
    let query_vector = match embed_query(&state.http_client, &llm_config, &query).await {
        Ok(vector) => Some(vector),
        Err(e) => {
            tracing::warn!(%request_id, "query embedding unavailable: {e}");
            None
        }
    };
    let vector_active = query_vector.is_some();

    // ── Step 2: Datastore search ──────────────────────────────
    let filters = SearchFilters::from_request(&req, query_vector);
    let outcome = state.store.search(&filters).await.map_err(|e| {
        state.metrics.record_error();
        tracing::error!(%request_id, "datastore search failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Search backend unavailable".to_string(),
        )
    })?;

    // ── Step 3: RRF fusion ────────────────────────────────────
    let fused = reciprocal_rank_fusion(
        &outcome.vector_ids,
        &outcome.keyword_ids,
        &outcome.spatial_ids,
    );
    let fused_count = fused.len();
    let fused_scores: HashMap<Uuid, f64> = fused.into_iter().collect();

    let mut properties: Vec<Property> = outcome.records;
    for prop in properties.iter_mut() {
        if let Some(score) = fused_scores.get(&prop.id) {
            prop.score = *score;
        }
    }
    properties.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // ── Step 4: Feature re-ranking, then trim to page ─────────
    cross_score(&query, &mut properties);
    properties.truncate(req.limit);

    // ── Step 5: Grounding context ─────────────────────────────
    let context = extract_top_k(&properties, state.config.context_k);

    // ── Steps 6-7: Narrative + hallucination guard ────────────
    let mut ai_summary = None;
    let mut verification: Option<VerificationSummary> = None;

    if !properties.is_empty() {
        let _permit = state.summary_semaphore.acquire().await.ok();
        match generate_summary(
            &state.http_client,
            &llm_config,
            &query,
            &context,
            outcome.total_count,
        )
        .await
        {
            Ok(raw_summary) => {
                let sources: Vec<serde_json::Value> = context
                    .iter()
                    .filter_map(|record| serde_json::to_value(record).ok())
                    .collect();

                match state.guard.check(&raw_summary, &sources) {
                    Ok(guarded) => {
                        let mismatch = guarded.verdict.verdict != VerdictKind::Clean;
                        state.metrics.record_verification(mismatch);
                        if mismatch {
                            tracing::warn!(
                                %request_id,
                                verdict = ?guarded.verdict.verdict,
                                unverified = guarded.verdict.unverified_claims,
                                "hallucination_detected"
                            );
                        }
                        verification = Some(VerificationSummary::from(&guarded.verdict));
                        ai_summary = Some(guarded.text);
                    }
                    Err(e) => {
                        // Reference data violating the numeric contract is a
                        // bug, not a retryable condition: log loudly, return
                        // no summary.
                        state.metrics.record_error();
                        tracing::error!(%request_id, "guard contract violation: {e}");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(%request_id, "summary generation failed: {e}");
            }
        }
    }

    let ai_verified = matches!(
        verification.as_ref().map(|v| v.verdict),
        Some(VerdictKind::Clean) | Some(VerdictKind::Warning)
    );

    let retrieval_method = if vector_active {
        "hybrid_vector+keyword+spatial+rrf+crossenc"
    } else {
        "hybrid_keyword+spatial+rrf+crossenc"
    };

    let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
    state.metrics.record_query(latency_ms);

    tracing::info!(
        %request_id,
        results = properties.len(),
        total = outcome.total_count,
        latency_ms,
        ai_verified,
        vector_search = vector_active,
        "query_complete"
    );

    Ok(Json(QueryResponse {
        query,
        request_id,
        total_results: outcome.total_count,
        ai_summary,
        ai_verified,
        verification,
        retrieval_method: retrieval_method.to_string(),
        latency_ms,
        metadata: QueryMetadata {
            vector_search_active: vector_active,
            vector_candidates: outcome.vector_ids.len(),
            keyword_candidates: outcome.keyword_ids.len(),
            spatial_candidates: outcome.spatial_ids.len(),
            fused_candidates: fused_count,
            reranked_to: properties.len(),
        },
        properties,
    }))
}
