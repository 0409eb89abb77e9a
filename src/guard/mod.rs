//! Hallucination guard: every numeric claim in a generated narrative is
//! cross-checked against the authoritative data that grounded it, and the
//! narrative is passed through, flagged, or rejected accordingly.

pub mod claims;
pub mod judge;
pub mod reference;
pub mod sanitize;

use serde_json::Value;

use crate::guard::claims::ClaimScanner;
use crate::guard::judge::{judge, GuardConfig, Verdict};
use crate::guard::reference::{GuardError, ReferenceValueSet};
use crate::guard::sanitize::sanitize;

/// Outcome of one verification pass: the text to return to the caller and
/// the verdict that produced it.
#[derive(Debug, Clone)]
pub struct GuardOutcome {
    pub text: String,
    pub verdict: Verdict,
}

/// Production-facing verifier bundling the claim scanner, the judge
/// policy, and the sanitizer. Construct once, share across requests; it
/// holds no per-request state.
pub struct HallucinationGuard {
    scanner: ClaimScanner,
    config: GuardConfig,
}

impl HallucinationGuard {
    pub fn new(config: GuardConfig) -> Self {
        let scanner = ClaimScanner::new(config.max_scan_chars);
        Self { scanner, config }
    }

    /// Verify `narrative` against ground-truth `sources` (serialized
    /// grounding context and/or tool outputs). Returns the sanitized text
    /// alongside the verdict. Errors only on reference data that violates
    /// the numeric contract.
    pub fn check(&self, narrative: &str, sources: &[Value]) -> Result<GuardOutcome, GuardError> {
        let claims = self.scanner.scan(narrative);
        let references = ReferenceValueSet::from_sources(sources.iter())?;
        let verdict = judge(&claims, &references, &self.config);

        tracing::info!(
            total_claims = verdict.total_claims,
            verified = verdict.verified_claims,
            unverified = verdict.unverified_claims,
            verdict = ?verdict.verdict,
            "hallucination_check"
        );

        let text = sanitize(narrative, &verdict);
        Ok(GuardOutcome { text, verdict })
    }
}

impl Default for HallucinationGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::judge::VerdictKind;
    use serde_json::json;

    #[test]
    fn test_truthful_narrative_passes_clean() {
        let guard = HallucinationGuard::default();
        let sources = vec![json!({
            "title": "Adyar Villa",
            "price": 15_501.0,
            "carpet_area_sqft": 2_053.0,
        })];
        let narrative = "There is a villa in Adyar for Rs 15,501 with 2053 sq ft area.";
        let outcome = guard.check(narrative, &sources).unwrap();
        assert_eq!(outcome.verdict.verdict, VerdictKind::Clean);
        assert_eq!(outcome.text, narrative);
    }

    #[test]
    fn test_fabricated_price_is_rejected() {
        let guard = HallucinationGuard::default();
        let sources = vec![json!({"price": 15_501.0, "carpet_area_sqft": 2_053.0})];
        let narrative = "There is a villa in Adyar for Rs 99,000 with 2053 sq ft area.";
        let outcome = guard.check(narrative, &sources).unwrap();
        assert_eq!(outcome.verdict.verdict, VerdictKind::Hallucination);
        assert!(!outcome.text.contains("99,000"));
    }

    #[test]
    fn test_empty_narrative_is_clean() {
        let guard = HallucinationGuard::default();
        let outcome = guard.check("", &[]).unwrap();
        assert_eq!(outcome.verdict.verdict, VerdictKind::Clean);
        assert_eq!(outcome.verdict.total_claims, 0);
    }
}
