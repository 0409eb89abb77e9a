//! # prop-intel
//!
//! A property intelligence service combining hybrid retrieval fusion with
//! a hallucination-guarded AI summary. The datastore (vector, full-text,
//! geospatial execution) and the LLM (embeddings, narrative generation)
//! are external collaborators reached over HTTP; this crate owns the
//! pipeline between them.
//!
//! ## Pipeline
//!
//! ```text
//!                      ┌──────────────┐
//!                      │  User Query   │
//!                      └───────┬──────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//!       ┌────────────────┐          ┌────────────────┐
//!       │ Query Embedding │          │ Structured      │
//!       │ (optional)      │          │ Filters         │
//!       └───────┬────────┘          └───────┬────────┘
//!               └─────────────┬──────────────┘
//!                             ▼
//!               ┌──────────────────────────┐
//!               │ Datastore sidecar search  │
//!               │ vector / keyword / spatial│
//!               └────────────┬─────────────┘
//!                            ▼
//!               ┌──────────────────────────┐
//!               │ RRF Fusion (K = 60)       │
//!               │ weights 1.0 / 0.8 / 0.6   │
//!               └────────────┬─────────────┘
//!                            ▼
//!               ┌──────────────────────────┐
//!               │ Feature Re-ranking        │
//!               │ budget · BHK · locality   │
//!               └────────────┬─────────────┘
//!                            ▼
//!               ┌──────────────────────────┐
//!               │ Top-K Grounding Context   │
//!               └────────────┬─────────────┘
//!                            ▼
//!               ┌──────────────────────────┐
//!               │ Strict-Evidence Narrative │
//!               └────────────┬─────────────┘
//!                            ▼
//!               ┌──────────────────────────┐
//!               │ Hallucination Guard       │
//!               │ scan → verify → sanitize  │
//!               └────────────┬─────────────┘
//!                            ▼
//!               ┌──────────────────────────┐
//!               │ Verified Response         │
//!               └──────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, datastore, LLM, and guard policy
//! - [`models`] - Shared data types: `Property`, request/response types
//! - [`search::fusion`] - Reciprocal Rank Fusion across the three retrieval rankings
//! - [`search::rerank`] - Feature-based re-scoring (budget, bedrooms, locality, trust flags)
//! - [`search::context`] - Lean top-K grounding context projection
//! - [`guard`] - Numeric claim scanner, reference index, verdict judge, response sanitizer
//! - [`llm`] - Query embeddings and strict-evidence summary generation (Ollama or OpenAI-compatible)
//! - [`store`] - Typed client for the datastore sidecar
//! - [`metrics`] - Atomic aggregate counters for the observability endpoint
//! - [`api`] - Axum HTTP handlers for query, health, metrics, and config
//! - [`state`] - Shared application state

pub mod api;
pub mod config;
pub mod guard;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod search;
pub mod state;
pub mod store;
