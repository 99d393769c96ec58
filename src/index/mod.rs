//! Search index construction
//!
//! This module turns crawled documents into the weighted term postings
//! the search engine queries:
//! - Tokenization with bilingual stop-word filtering
//! - Field-weighted posting aggregation (title > description > body)
//! - Document indexing, bulk reindexing, and index maintenance

mod indexer;
mod stopwords;
mod tokenizer;

pub use indexer::{
    collect_postings, index_document, optimize, reindex_project, reindex_site, OptimizeSummary,
    ReindexSummary, BODY_WEIGHT, DESCRIPTION_WEIGHT, TITLE_WEIGHT,
};
pub use stopwords::{is_english_stop_word, is_index_stop_word, is_query_stop_word};
pub use tokenizer::{tokenize, MAX_TERM_LENGTH, MIN_TERM_LENGTH};
