use std::collections::HashSet;

use serde::Serialize;

use crate::guard::claims::{ClaimKind, NumericClaim};
use crate::guard::reference::{ClosestReference, ReferenceValueSet};

/// Tunable verification policy, injected at guard construction.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Absolute tolerance for claim-vs-reference comparison.
    pub abs_tolerance: f64,
    /// Relative tolerance, applied only against non-zero references.
    pub rel_tolerance: f64,
    /// Claim kinds accepted without lookup: low fraud value, high
    /// false-positive risk.
    pub safe_claim_kinds: HashSet<ClaimKind>,
    /// Upper bound on how much narrative the claim scanner reads.
    pub max_scan_chars: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            abs_tolerance: 0.01,
            rel_tolerance: 0.05,
            safe_claim_kinds: HashSet::from([ClaimKind::Bhk]),
            max_scan_chars: 20_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    Clean,
    Warning,
    Hallucination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    None,
    Flagged,
    Rejected,
}

/// An unverified claim with the nearest reference for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct Mismatch {
    pub claimed_value: f64,
    pub claim_kind: ClaimKind,
    pub raw_text: String,
    pub offset: usize,
    pub closest_reference: Option<ClosestReference>,
}

/// Result of verifying one narrative. Immutable once created;
/// `total_claims == verified_claims + unverified_claims` always holds.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub total_claims: usize,
    pub verified_claims: usize,
    pub unverified_claims: usize,
    pub mismatches: Vec<Mismatch>,
    pub verdict: VerdictKind,
    pub action: Action,
    pub confidence: f64,
    pub details: String,
}

impl Verdict {
    fn clean_empty() -> Self {
        Self {
            total_claims: 0,
            verified_claims: 0,
            unverified_claims: 0,
            mismatches: Vec::new(),
            verdict: VerdictKind::Clean,
            action: Action::None,
            confidence: 1.0,
            details: "No numeric claims to verify".to_string(),
        }
    }
}

/// Classify a narrative's claims against the reference universe.
///
/// Pure function of its inputs. The severity thresholds are deliberate:
/// one unverified claim is tolerated as a warning only when the narrative
/// made more than three claims overall, so a short narrative is judged
/// more harshly per unverified claim than a long one.
pub fn judge(
    claims: &[NumericClaim],
    references: &ReferenceValueSet,
    config: &GuardConfig,
) -> Verdict {
    if claims.is_empty() {
        return Verdict::clean_empty();
    }

    let total_claims = claims.len();
    let mut verified_claims = 0;
    let mut mismatches = Vec::new();

    for claim in claims {
        if config.safe_claim_kinds.contains(&claim.kind) {
            verified_claims += 1;
            continue;
        }

        if references.matches(claim.value, config.abs_tolerance, config.rel_tolerance) {
            verified_claims += 1;
        } else {
            mismatches.push(Mismatch {
                claimed_value: claim.value,
                claim_kind: claim.kind,
                raw_text: claim.raw.clone(),
                offset: claim.offset,
                closest_reference: references.closest(claim.value),
            });
        }
    }

    let unverified_claims = total_claims - verified_claims;
    let unverified_ratio = unverified_claims as f64 / total_claims as f64;

    let (verdict, action, confidence) = if unverified_claims == 0 {
        (VerdictKind::Clean, Action::None, 1.0)
    } else if unverified_claims <= 1 && total_claims > 3 {
        (VerdictKind::Warning, Action::Flagged, 1.0 - unverified_ratio)
    } else {
        (
            VerdictKind::Hallucination,
            Action::Rejected,
            (1.0 - unverified_ratio).max(0.0),
        )
    };

    let details = format!(
        "Verified {verified_claims}/{total_claims} claims; {unverified_claims} unverified"
    );

    Verdict {
        total_claims,
        verified_claims,
        unverified_claims,
        mismatches,
        verdict,
        action,
        confidence,
        details,
    }
}
