use std::collections::HashSet;

use regex::Regex;

use crate::models::Property;

/// Query-side signals parsed once per rerank call.
#[derive(Debug, Clone)]
pub struct QueryFeatures {
    /// Budget in rupees, parsed from "60 lakhs" / "2 cr" style phrases.
    pub budget: Option<f64>,
    /// Target bedroom count from "3 bhk" / "3 bedroom" phrases.
    pub target_bedrooms: Option<i64>,
    /// Lower-cased word tokens of the full query.
    pub tokens: HashSet<String>,
}

/// Parse budget, bedroom target, and word tokens from a free-text query.
/// Lakh takes precedence over crore when both phrasings appear.
pub fn parse_query(query: &str) -> QueryFeatures {
    let query_lower = query.to_lowercase();

    let lakh_re = Regex::new(r"(\d+(?:\.\d+)?)\s*(?:lakh|lakhs|l\b)").unwrap();
    let crore_re = Regex::new(r"(\d+(?:\.\d+)?)\s*(?:cr|crore|crores)").unwrap();
    let bhk_re = Regex::new(r"(\d)\s*(?:bhk|bedroom|bed)").unwrap();
    let token_re = Regex::new(r"\w+").unwrap();

    let budget = if let Some(caps) = lakh_re.captures(&query_lower) {
        caps[1].parse::<f64>().ok().map(|v| v * 100_000.0)
    } else if let Some(caps) = crore_re.captures(&query_lower) {
        caps[1].parse::<f64>().ok().map(|v| v * 10_000_000.0)
    } else {
        None
    };

    let target_bedrooms = bhk_re
        .captures(&query_lower)
        .and_then(|caps| caps[1].parse::<i64>().ok());

    let tokens = token_re
        .find_iter(&query_lower)
        .map(|m| m.as_str().to_string())
        .collect();

    QueryFeatures {
        budget,
        target_bedrooms,
        tokens,
    }
}

/// Feature-based cross-scoring over fused candidates.
///
/// Each signal adds to the candidate's existing (fused) score:
/// token overlap with title+locality, budget proximity, bedroom match,
/// exact locality mention, and the verified/featured trust flags.
/// Candidates are stably re-sorted descending, so score ties keep their
/// fused order.
pub fn cross_score(query: &str, properties: &mut Vec<Property>) {
    let features = parse_query(query);
    let query_lower = query.to_lowercase();
    let token_re = Regex::new(r"\w+").unwrap();

    for prop in properties.iter_mut() {
        let mut score = prop.score;

        let title = prop.title.to_lowercase();
        let locality = prop.locality.to_lowercase();
        let prop_tokens: HashSet<String> = token_re
            .find_iter(&format!("{title} {locality}"))
            .map(|m| m.as_str().to_string())
            .collect();

        // Token overlap
        if !features.tokens.is_empty() && !prop_tokens.is_empty() {
            let overlap = features.tokens.intersection(&prop_tokens).count() as f64
                / (features.tokens.len() + 1) as f64;
            score += overlap * 0.4;
        }

        // Budget proximity: tighter in-budget fit earns a larger bonus,
        // over-budget draws a capped penalty.
        if let Some(budget) = features.budget {
            if prop.price > 0.0 {
                if prop.price <= budget {
                    score += 0.3 * (prop.price / budget);
                } else {
                    let over_pct = (prop.price - budget) / budget;
                    score -= (over_pct * 0.5).min(0.2);
                }
            }
        }

        // Bedroom match: exact or one off
        if let (Some(target), Some(bedrooms)) = (features.target_bedrooms, prop.bedrooms) {
            if bedrooms == target {
                score += 0.25;
            } else if (bedrooms - target).abs() == 1 {
                score += 0.1;
            }
        }

        // Locality exact mention
        if !locality.is_empty() && query_lower.contains(&locality) {
            score += 0.35;
        }

        // Trust signals
        if prop.is_verified {
            score += 0.10;
        }
        if prop.is_featured {
            score += 0.05;
        }

        prop.score = round6(score);
    }

    properties.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
