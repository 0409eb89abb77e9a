use crate::guard::judge::{Verdict, VerdictKind};

/// Appended to narratives that pass with a warning.
pub const DISCLAIMER: &str = "\n\n*Some data points in this response could not be verified \
against our records. Please verify independently.*";

/// Replaces a narrative rejected as hallucinated. Must share no substring
/// with property data, so it contains no digits or currency symbols.
pub const REJECTION_MESSAGE: &str = "I cannot provide a reliable answer to this request. \
Some of the generated figures did not match our records. Try rephrasing, or ask about \
one specific property.";

const UNVERIFIED_MARKER: &str = "**[unverified]** ";

/// Apply a verdict to the narrative it was produced for.
///
/// Warning-level mismatches are annotated by splicing at the byte offsets
/// recorded during claim extraction, not by text search, so an identical
/// substring appearing elsewhere with a different meaning is left alone.
pub fn sanitize(narrative: &str, verdict: &Verdict) -> String {
    match verdict.verdict {
        VerdictKind::Clean => narrative.to_string(),
        VerdictKind::Hallucination => REJECTION_MESSAGE.to_string(),
        VerdictKind::Warning => {
            let mut spans: Vec<(usize, &str)> = verdict
                .mismatches
                .iter()
                .map(|m| (m.offset, m.raw_text.as_str()))
                .collect();
            spans.sort_by(|a, b| b.0.cmp(&a.0));
            spans.dedup();

            let mut flagged = narrative.to_string();
            for (offset, raw) in spans {
                // Splice only if the narrative still carries the exact raw
                // text at the recorded offset.
                let end = offset + raw.len();
                if end <= flagged.len()
                    && flagged.is_char_boundary(offset)
                    && flagged.is_char_boundary(end)
                    && &flagged[offset..end] == raw
                {
                    flagged.insert_str(offset, UNVERIFIED_MARKER);
                }
            }

            flagged.push_str(DISCLAIMER);
            flagged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::claims::ClaimKind;
    use crate::guard::judge::{Action, Mismatch};

    fn verdict_with(kind: VerdictKind, mismatches: Vec<Mismatch>) -> Verdict {
        let unverified = mismatches.len();
        Verdict {
            total_claims: 5,
            verified_claims: 5 - unverified,
            unverified_claims: unverified,
            mismatches,
            verdict: kind,
            action: match kind {
                VerdictKind::Clean => Action::None,
                VerdictKind::Warning => Action::Flagged,
                VerdictKind::Hallucination => Action::Rejected,
            },
            confidence: 0.8,
            details: String::new(),
        }
    }

    fn mismatch(raw: &str, offset: usize) -> Mismatch {
        Mismatch {
            claimed_value: 0.0,
            claim_kind: ClaimKind::Percentage,
            raw_text: raw.to_string(),
            offset,
            closest_reference: None,
        }
    }

    #[test]
    fn test_clean_passthrough() {
        let narrative = "Prices rose 8.45% this year.";
        let verdict = verdict_with(VerdictKind::Clean, vec![]);
        assert_eq!(sanitize(narrative, &verdict), narrative);
    }

    #[test]
    fn test_warning_annotates_at_offset() {
        let narrative = "Growth hit 25% in Adyar.";
        let verdict = verdict_with(VerdictKind::Warning, vec![mismatch("25%", 11)]);
        let out = sanitize(narrative, &verdict);
        assert!(out.starts_with("Growth hit **[unverified]** 25% in Adyar."));
        assert!(out.ends_with(DISCLAIMER));
    }

    #[test]
    fn test_warning_leaves_identical_substring_elsewhere() {
        // "25%" appears twice; only the flagged occurrence is annotated.
        let narrative = "Tax is 25% but growth hit 25% too.";
        let verdict = verdict_with(VerdictKind::Warning, vec![mismatch("25%", 26)]);
        let out = sanitize(narrative, &verdict);
        assert!(out.contains("Tax is 25% but"));
        assert!(out.contains("growth hit **[unverified]** 25% too."));
        assert_eq!(out.matches(UNVERIFIED_MARKER).count(), 1);
    }

    #[test]
    fn test_warning_multiple_mismatches_splice_back_to_front() {
        let narrative = "A 10% rise, then a 20% fall.";
        let verdict = verdict_with(
            VerdictKind::Warning,
            vec![mismatch("10%", 2), mismatch("20%", 19)],
        );
        let out = sanitize(narrative, &verdict);
        assert!(out.contains("A **[unverified]** 10% rise"));
        assert!(out.contains("a **[unverified]** 20% fall"));
    }

    #[test]
    fn test_warning_skips_stale_offset() {
        // Offset no longer matching the raw text must not corrupt output.
        let narrative = "Short text.";
        let verdict = verdict_with(VerdictKind::Warning, vec![mismatch("99%", 500)]);
        let out = sanitize(narrative, &verdict);
        assert!(out.starts_with("Short text."));
        assert!(!out.contains(UNVERIFIED_MARKER));
    }

    #[test]
    fn test_hallucination_returns_fixed_rejection() {
        let narrative = "₹99,00,000 CAGR 45.2% Adyar 2BHK";
        let verdict = verdict_with(VerdictKind::Hallucination, vec![]);
        assert_eq!(sanitize(narrative, &verdict), REJECTION_MESSAGE);
    }

    #[test]
    fn test_hallucination_leaks_no_narrative_substring() {
        let narrative = "₹99,00,000 fetched 45.2% CAGR near Thiruvanmiyur 2BHK flats";
        let verdict = verdict_with(VerdictKind::Hallucination, vec![]);
        let out = sanitize(narrative, &verdict);
        let bytes: Vec<char> = narrative.chars().collect();
        for window in bytes.windows(4) {
            let fragment: String = window.iter().collect();
            assert!(
                !out.contains(&fragment),
                "rejection output leaked narrative fragment {fragment:?}"
            );
        }
    }
}
