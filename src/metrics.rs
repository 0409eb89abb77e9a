use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

/// Latency samples kept for percentile stats.
const MAX_LATENCY_HISTORY: usize = 500;

/// Aggregate counters for the observability endpoint. Owned by the app
/// state and updated from concurrent request handlers, so counters are
/// atomic and the latency history sits behind a lock with a hard cap.
pub struct Metrics {
    started_at: Instant,
    total_queries: AtomicU64,
    total_errors: AtomicU64,
    total_verifications: AtomicU64,
    total_mismatches: AtomicU64,
    latencies_ms: Mutex<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_seconds: f64,
    pub total_queries: u64,
    pub total_errors: u64,
    pub total_verifications: u64,
    pub total_mismatches: u64,
    pub mismatch_rate: f64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_queries: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            total_verifications: AtomicU64::new(0),
            total_mismatches: AtomicU64::new(0),
            latencies_ms: Mutex::new(Vec::new()),
        }
    }

    pub fn record_query(&self, latency_ms: f64) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        let mut latencies = self.latencies_ms.lock();
        latencies.push(latency_ms);
        if latencies.len() > MAX_LATENCY_HISTORY * 2 {
            let split_at = latencies.len() - MAX_LATENCY_HISTORY;
            let keep = latencies.split_off(split_at);
            *latencies = keep;
        }
    }

    pub fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one guard verification; `mismatch` is true for warning or
    /// hallucination verdicts.
    pub fn record_verification(&self, mismatch: bool) {
        self.total_verifications.fetch_add(1, Ordering::Relaxed);
        if mismatch {
            self.total_mismatches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let latencies = self.latencies_ms.lock().clone();
        let avg = if latencies.is_empty() {
            0.0
        } else {
            latencies.iter().sum::<f64>() / latencies.len() as f64
        };
        let p95 = {
            let mut sorted = latencies;
            sorted.sort_by(f64::total_cmp);
            if sorted.is_empty() {
                0.0
            } else {
                let idx = ((sorted.len() as f64 * 0.95) as usize).saturating_sub(1);
                sorted[idx]
            }
        };

        let verifications = self.total_verifications.load(Ordering::Relaxed);
        let mismatches = self.total_mismatches.load(Ordering::Relaxed);
        let mismatch_rate = if verifications > 0 {
            mismatches as f64 / verifications as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            uptime_seconds: self.started_at.elapsed().as_secs_f64(),
            total_queries: self.total_queries.load(Ordering::Relaxed),
            total_errors: self.total_errors.load(Ordering::Relaxed),
            total_verifications: verifications,
            total_mismatches: mismatches,
            mismatch_rate,
            avg_latency_ms: avg,
            p95_latency_ms: p95,
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
