//! Relevance scoring
//!
//! Candidates are scored in memory after retrieval: term matches are weighted
//! by field (title > description > body), quoted phrases found in the title or
//! description earn a flat bonus, and link authority plus content quality
//! contribute a small static part so equally-matched documents still rank.

use serde::Serialize;

use crate::storage::SearchCandidate;

use super::analyzer::QueryAnalysis;

/// Multiplier for a term match in the title
pub const TITLE_FACTOR: f64 = 3.0;
/// Multiplier for a term match in the description
pub const DESCRIPTION_FACTOR: f64 = 2.0;
/// Multiplier for a term match in the body content
pub const CONTENT_FACTOR: f64 = 1.0;
/// Flat bonus for a quoted phrase found in the title or description
pub const PHRASE_BONUS: f64 = 5.0;
/// Contribution of the document's pagerank score
pub const PAGERANK_FACTOR: f64 = 0.5;
/// Contribution of the document's quality score
pub const QUALITY_FACTOR: f64 = 0.3;

/// Per-result score components, rounded for display
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    /// Full relevance score, including the static part
    pub relevance: f64,
    pub pagerank: f64,
    pub quality: f64,
}

impl ScoreBreakdown {
    pub fn new(relevance: f64, pagerank: f64, quality: f64) -> Self {
        Self {
            relevance: round3(relevance),
            pagerank: round3(pagerank),
            quality: round3(quality),
        }
    }
}

/// Computes the relevance score of a candidate for an analyzed query
///
/// Every term (typed or synonym) contributes its weight once per field it
/// appears in, as a case-insensitive substring. Phrases only count against
/// title and description.
pub fn relevance_score(candidate: &SearchCandidate, analysis: &QueryAnalysis) -> f64 {
    let title = candidate.title.as_deref().unwrap_or_default().to_lowercase();
    let description = candidate
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let content = candidate.content.to_lowercase();

    let mut score = 0.0;
    for term in &analysis.terms {
        if title.contains(&term.term) {
            score += TITLE_FACTOR * term.weight;
        }
        if description.contains(&term.term) {
            score += DESCRIPTION_FACTOR * term.weight;
        }
        if content.contains(&term.term) {
            score += CONTENT_FACTOR * term.weight;
        }
    }

    for phrase in &analysis.phrases {
        let lowered = phrase.to_lowercase();
        if title.contains(&lowered) || description.contains(&lowered) {
            score += PHRASE_BONUS;
        }
    }

    score + PAGERANK_FACTOR * candidate.pagerank_score + QUALITY_FACTOR * candidate.quality_score
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
