//! Query analysis and ranked search
//!
//! This module implements the read side of the engine:
//! - Query analysis with phrase extraction, synonym expansion, and intent
//!   and language detection
//! - In-memory relevance scoring over substring-retrieved candidates
//! - Result enrichment: highlighting, snippets, reading time, quality
//! - Facets and autocomplete suggestions

mod analyzer;
mod enrich;
mod executor;
mod scorer;
mod suggest;
mod synonyms;

pub use analyzer::{analyze, QueryAnalysis, QueryIntent, QueryTerm, TermKind};
pub use enrich::{
    content_quality, highlight_terms, reading_time, snippet, ContentQuality, ReadingTime,
};
pub use executor::{
    execute, EnrichedResult, FacetCount, Facets, SearchOptions, SearchResponse, SortOrder,
};
pub use scorer::{relevance_score, ScoreBreakdown};
pub use suggest::suggestions;
pub use synonyms::{synonyms_for, SYNONYM_WEIGHT};
