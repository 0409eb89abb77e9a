use serde_json::Value;
use thiserror::Error;

/// Contract violations while building a reference set. These indicate a
/// programming error upstream, not a transient condition.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("non-finite numeric value in reference data")]
    NonFiniteReference,
}

/// The closest reference to an unverified claim, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClosestReference {
    pub value: f64,
    pub difference_percent: f64,
}

/// A tolerant lookup universe of authoritative numeric values.
///
/// Built once per verification call by flattening arbitrary nested ground
/// truth (tool outputs, retrieved records). Every numeric leaf `v` is
/// inserted, and for `v ≠ 0` the rounded and unit-shifted variants as well
/// (fraction→percent, rupees→lakh, rupees→crore), so a narrative can phrase
/// a stored value in any common unit without failing verification.
/// Read-only after construction.
#[derive(Debug, Clone)]
pub struct ReferenceValueSet {
    values: Vec<f64>,
}

impl ReferenceValueSet {
    /// Flatten one or more JSON structures into the reference universe.
    pub fn from_sources<'a, I>(sources: I) -> Result<Self, GuardError>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut leaves = Vec::new();
        for source in sources {
            collect_numeric_leaves(source, &mut leaves)?;
        }

        let mut values = Vec::with_capacity(leaves.len() * 7);
        for v in leaves {
            values.push(v);
            if v != 0.0 {
                values.push(round_to(v, 2));
                values.push(round_to(v, 4));
                values.push(round_to(v * 100.0, 2));
                values.push(round_to(v * 100.0, 4));
                values.push(round_to(v / 100_000.0, 2));
                values.push(round_to(v / 10_000_000.0, 2));
            }
        }

        values.sort_by(f64::total_cmp);
        values.dedup();

        Ok(Self { values })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if some reference matches `claim` within the absolute or
    /// relative tolerance. Zero references only match absolutely.
    pub fn matches(&self, claim: f64, abs_tolerance: f64, rel_tolerance: f64) -> bool {
        self.values.iter().any(|&reference| {
            (claim - reference).abs() < abs_tolerance
                || (reference != 0.0
                    && (claim - reference).abs() / reference.abs() < rel_tolerance)
        })
    }

    /// The reference closest to `claim` by absolute difference, with its
    /// percentage difference for diagnostics.
    pub fn closest(&self, claim: f64) -> Option<ClosestReference> {
        let closest = self
            .values
            .iter()
            .copied()
            .min_by(|a, b| (a - claim).abs().total_cmp(&(b - claim).abs()))?;
        let difference_percent = (claim - closest).abs() / closest.abs().max(0.01) * 100.0;
        Some(ClosestReference {
            value: closest,
            difference_percent: round_to(difference_percent, 2),
        })
    }
}

fn collect_numeric_leaves(value: &Value, out: &mut Vec<f64>) -> Result<(), GuardError> {
    match value {
        Value::Number(n) => {
            let v = n.as_f64().ok_or(GuardError::NonFiniteReference)?;
            if !v.is_finite() {
                return Err(GuardError::NonFiniteReference);
            }
            out.push(v);
        }
        Value::Array(items) => {
            for item in items {
                collect_numeric_leaves(item, out)?;
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_numeric_leaves(item, out)?;
            }
        }
        // Strings, booleans, and nulls are not numeric leaves.
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
    Ok(())
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: &Value) -> ReferenceValueSet {
        ReferenceValueSet::from_sources([value]).unwrap()
    }

    #[test]
    fn test_nested_structures_flatten() {
        let source = json!({
            "metrics": {"cagr": 0.0845, "scores": [0.7, 0.9]},
            "records": [{"price": 8_500_000.0}],
            "note": "text is ignored",
            "flag": true,
        });
        let set = build(&source);
        assert!(set.matches(0.0845, 0.01, 0.05));
        assert!(set.matches(0.7, 0.001, 0.0));
        assert!(set.matches(8_500_000.0, 0.01, 0.05));
    }

    #[test]
    fn test_unit_transforms_absorb_lakh_and_crore_phrasing() {
        let set = build(&json!({"price": 8_500_000.0}));
        // 85 lakh and 0.85 crore phrasings of the same stored rupee value
        assert!(set.matches(85.0, 0.01, 0.05));
        assert!(set.matches(0.85, 0.01, 0.05));
    }

    #[test]
    fn test_fraction_to_percent_transform() {
        let set = build(&json!({"cagr": 0.0845}));
        assert!(set.matches(8.45, 0.01, 0.05));
    }

    #[test]
    fn test_zero_gets_no_transforms() {
        let set = build(&json!({"v": 0.0}));
        assert_eq!(set.len(), 1);
        assert!(set.matches(0.0, 0.01, 0.05));
    }

    #[test]
    fn test_relative_tolerance() {
        let set = build(&json!({"price": 100.0}));
        // Within 5%
        assert!(set.matches(104.0, 0.01, 0.05));
        // Outside 5%
        assert!(!set.matches(106.0, 0.01, 0.05));
    }

    #[test]
    fn test_absolute_tolerance() {
        let set = build(&json!({"v": 0.5}));
        assert!(set.matches(0.505, 0.01, 0.0));
        assert!(!set.matches(0.52, 0.01, 0.0));
    }

    #[test]
    fn test_closest_picks_minimum_difference() {
        let set = build(&json!([10.0, 50.0, 90.0]));
        let closest = set.closest(42.0).unwrap();
        assert_eq!(closest.value, 50.0);
        assert_eq!(closest.difference_percent, 16.0);
    }

    #[test]
    fn test_closest_on_empty_set() {
        let set = build(&json!({"note": "nothing numeric"}));
        assert!(set.is_empty());
        assert!(set.closest(1.0).is_none());
    }

    #[test]
    fn test_duplicate_values_dedup() {
        let set = build(&json!([5.0, 5.0, 5.0]));
        // 5.0 plus its six transforms, minus coincident rounds
        assert!(set.len() <= 7);
    }

    #[test]
    fn test_multiple_sources_union() {
        let a = json!({"cagr_percent": 8.45});
        let b = json!({"price": 9_000_000.0});
        let set = ReferenceValueSet::from_sources([&a, &b]).unwrap();
        assert!(set.matches(8.45, 0.01, 0.05));
        assert!(set.matches(90.0, 0.01, 0.05)); // lakh form
    }
}
