use regex::Regex;
use serde::{Deserialize, Serialize};

/// The kind of numeric claim a pattern extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    Price,
    PriceCrore,
    PriceLakh,
    Percentage,
    Cagr,
    PricePerSqft,
    DistanceKm,
    DistanceM,
    Score,
    Bhk,
    AreaSqft,
}

/// A numeric claim found in narrative text. Immutable; `offset` is the
/// byte position of the full match in the scanned text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericClaim {
    pub kind: ClaimKind,
    pub value: f64,
    pub raw: String,
    pub offset: usize,
}

/// Extracts typed numeric claims from narrative text.
///
/// Each pattern is applied independently over the whole text, so one
/// substring can yield claims of more than one kind (a CAGR figure is also
/// a generic percentage). That duplication is deliberate: the judge treats
/// each extraction as its own claim.
pub struct ClaimScanner {
    patterns: Vec<(ClaimKind, Regex)>,
    max_scan_chars: usize,
}

impl ClaimScanner {
    /// Compile the fixed pattern table. `max_scan_chars` bounds how much
    /// narrative is scanned; anything beyond it is ignored.
    pub fn new(max_scan_chars: usize) -> Self {
        let table: &[(ClaimKind, &str)] = &[
            // ₹1,23,456 / Rs. 1,23,456 / INR 5000000
            (ClaimKind::Price, r"₹\s*([\d,]+(?:\.\d+)?)"),
            (ClaimKind::Price, r"(?i)(?:Rs\.?|INR)\s*([\d,]+(?:\.\d+)?)"),
            (ClaimKind::PriceCrore, r"(?i)([\d.]+)\s*(?:crore|cr)"),
            (ClaimKind::PriceLakh, r"(?i)([\d.]+)\s*(?:lakh|lac|l)"),
            (ClaimKind::Percentage, r"([\d.]+)\s*%"),
            (ClaimKind::Cagr, r"(?i)CAGR[:\s]+(?:of\s+|is\s+)?([\d.]+)\s*%"),
            (
                ClaimKind::PricePerSqft,
                r"(?i)([\d,]+(?:\.\d+)?)\s*(?:per\s*sq\s*ft|/sq\s*ft|psf)",
            ),
            (ClaimKind::DistanceKm, r"(?i)([\d.]+)\s*(?:km|kilometer)"),
            (ClaimKind::DistanceM, r"(?i)([\d.]+)\s*(?:meter|m)\b"),
            (ClaimKind::Score, r"(?i)(?:score|rating)[:\s]+([\d.]+)"),
            (ClaimKind::Bhk, r"(?i)(\d+)\s*BHK"),
            (ClaimKind::AreaSqft, r"(?i)([\d,]+(?:\.\d+)?)\s*sq\s*ft"),
        ];

        let patterns = table
            .iter()
            .map(|(kind, pattern)| {
                let re = Regex::new(pattern).unwrap_or_else(|e| {
                    panic!("invalid claim pattern for {kind:?}: {e}");
                });
                (*kind, re)
            })
            .collect();

        Self {
            patterns,
            max_scan_chars,
        }
    }

    /// Scan narrative text for numeric claims, ordered by offset.
    /// Text with no numeric content yields an empty list; never errors.
    pub fn scan(&self, text: &str) -> Vec<NumericClaim> {
        let text = bounded_prefix(text, self.max_scan_chars);

        let mut claims = Vec::new();
        for (kind, re) in &self.patterns {
            for caps in re.captures_iter(text) {
                let (Some(full), Some(group)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let digits = group.as_str().replace(',', "");
                let Ok(value) = digits.parse::<f64>() else {
                    // Captures like "8.4.5" are not numbers; skip them.
                    continue;
                };
                claims.push(NumericClaim {
                    kind: *kind,
                    value,
                    raw: full.as_str().to_string(),
                    offset: full.start(),
                });
            }
        }

        claims.sort_by_key(|c| c.offset);
        claims
    }
}

/// Truncate to at most `max_chars` bytes on a UTF-8 char boundary.
fn bounded_prefix(text: &str, max_chars: usize) -> &str {
    if text.len() <= max_chars {
        return text;
    }
    let mut end = max_chars;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
