//! Autocomplete suggestions
//!
//! Completions come from two sources: the term index (ordered by total
//! frequency) and document titles (ordered by pagerank, then recency).

use crate::storage::{StorageResult, Store};

/// Maximum number of suggestions returned
const MAX_SUGGESTIONS: usize = 8;
/// How many indexed terms to pull
const TERM_SUGGESTIONS: u32 = 5;
/// How many document titles to pull
const TITLE_SUGGESTIONS: u32 = 3;

/// Returns completions for a partial query
///
/// Indexed terms come first, then titles; duplicates are dropped without
/// regard to case. Queries shorter than two characters return nothing.
pub fn suggestions<S: Store>(
    store: &S,
    query: &str,
    project_id: Option<i64>,
) -> StorageResult<Vec<String>> {
    let trimmed = query.trim();
    if trimmed.chars().count() < 2 {
        return Ok(Vec::new());
    }

    let pattern = format!("%{}%", trimmed.to_lowercase());
    let mut results: Vec<String> = Vec::new();

    for term in store.suggest_terms(&pattern, project_id, TERM_SUGGESTIONS)? {
        push_unique(&mut results, term);
    }
    for title in store.suggest_titles(&pattern, project_id, TITLE_SUGGESTIONS)? {
        push_unique(&mut results, title);
    }

    results.truncate(MAX_SUGGESTIONS);
    Ok(results)
}

fn push_unique(results: &mut Vec<String>, candidate: String) {
    if !results
        .iter()
        .any(|existing| existing.eq_ignore_ascii_case(&candidate))
    {
        results.push(candidate);
    }
}
