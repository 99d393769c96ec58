//! Document indexing
//!
//! Builds weighted term postings from a document's fields and writes them
//! through the storage layer. Reindexing replaces a document's postings
//! wholesale, so it is safe to run at any time.

use crate::index::tokenizer::tokenize;
use crate::storage::{StorageError, Store, TermPosting};
use crate::Result;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Weight of a term occurrence in the document title
pub const TITLE_WEIGHT: f64 = 3.0;

/// Weight of a term occurrence in the meta description
pub const DESCRIPTION_WEIGHT: f64 = 2.0;

/// Weight of a term occurrence in the body text
pub const BODY_WEIGHT: f64 = 1.0;

/// Outcome of a bulk reindex over a site or project
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReindexSummary {
    /// Documents reindexed successfully
    pub documents: u64,
    /// Postings written in total
    pub postings: u64,
    /// Documents that failed to reindex
    pub failures: u64,
}

/// Outcome of an index maintenance pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeSummary {
    /// Postings removed because their document no longer exists
    pub orphans_removed: u64,
}

struct TermAccumulator {
    frequency: u32,
    weight: f64,
    field: &'static str,
    context: Option<String>,
}

fn term_hash(term: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(term.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extracts a display context window around the first occurrence of a term
///
/// The window starts 50 characters before the term and runs for at most
/// 200 characters. If the term is not found as a substring (it may have
/// been reshaped by tokenization), the first 100 characters stand in.
fn extract_context(term: &str, text: &str) -> String {
    let lowered = text.to_lowercase();
    match lowered.find(term) {
        Some(byte_pos) => {
            let char_pos = lowered[..byte_pos].chars().count();
            let start = char_pos.saturating_sub(50);
            text.chars().skip(start).take(200).collect()
        }
        None => text.chars().take(100).collect(),
    }
}

/// Builds the weighted postings for one document
///
/// # Arguments
///
/// * `title` - Document title, if any
/// * `description` - Meta description, if any
/// * `body` - Extracted body text
///
/// # Returns
///
/// One posting per distinct term, sorted by term. Frequency counts
/// occurrences across all three fields; the weight is the highest field
/// weight scaled by `1 + ln(frequency)`; field and context come from the
/// highest-weighted occurrence.
pub fn collect_postings(
    title: Option<&str>,
    description: Option<&str>,
    body: &str,
) -> Vec<TermPosting> {
    let mut accumulators: HashMap<String, TermAccumulator> = HashMap::new();

    let fields: [(Option<&str>, f64, &'static str); 3] = [
        (title, TITLE_WEIGHT, "title"),
        (description, DESCRIPTION_WEIGHT, "description"),
        (Some(body), BODY_WEIGHT, "content"),
    ];

    for (text, field_weight, field_name) in fields {
        let Some(text) = text else { continue };
        if text.is_empty() {
            continue;
        }

        for term in tokenize(text) {
            match accumulators.get_mut(&term) {
                Some(acc) => {
                    acc.frequency += 1;
                    if field_weight > acc.weight {
                        acc.weight = field_weight;
                        acc.field = field_name;
                    }
                }
                None => {
                    let context = extract_context(&term, text);
                    accumulators.insert(
                        term,
                        TermAccumulator {
                            frequency: 1,
                            weight: field_weight,
                            field: field_name,
                            context: if context.is_empty() {
                                None
                            } else {
                                Some(context)
                            },
                        },
                    );
                }
            }
        }
    }

    let mut postings: Vec<TermPosting> = accumulators
        .into_iter()
        .map(|(term, acc)| {
            let hash = term_hash(&term);
            TermPosting {
                term,
                term_hash: hash,
                frequency: acc.frequency,
                weight: acc.weight * (1.0 + f64::from(acc.frequency).ln()),
                field: acc.field.to_string(),
                context: acc.context,
            }
        })
        .collect();
    postings.sort_by(|a, b| a.term.cmp(&b.term));
    postings
}

/// Indexes one document, replacing any postings it already has
///
/// # Returns
///
/// The number of postings written.
pub fn index_document<S: Store>(
    store: &mut S,
    document_id: i64,
    project_id: i64,
    title: Option<&str>,
    description: Option<&str>,
    body: &str,
) -> std::result::Result<usize, StorageError> {
    let postings = collect_postings(title, description, body);
    store.replace_document_terms(document_id, project_id, &postings)?;
    Ok(postings.len())
}

fn reindex_documents<S: Store>(
    store: &mut S,
    docs: Vec<crate::storage::DocumentRecord>,
) -> ReindexSummary {
    let mut summary = ReindexSummary::default();
    for doc in docs {
        match index_document(
            store,
            doc.id,
            doc.project_id,
            doc.title.as_deref(),
            doc.description.as_deref(),
            &doc.content,
        ) {
            Ok(count) => {
                summary.documents += 1;
                summary.postings += count as u64;
            }
            Err(e) => {
                tracing::warn!(document_id = doc.id, url = %doc.url, "Reindex failed: {}", e);
                summary.failures += 1;
            }
        }
    }
    summary
}

/// Rebuilds the index for every document of a site
pub fn reindex_site<S: Store>(store: &mut S, site_id: i64) -> Result<ReindexSummary> {
    let docs = store.list_documents_for_site(site_id)?;
    tracing::info!(site_id, documents = docs.len(), "Reindexing site");
    Ok(reindex_documents(store, docs))
}

/// Rebuilds the index for every document of a project
pub fn reindex_project<S: Store>(store: &mut S, project_id: i64) -> Result<ReindexSummary> {
    let docs = store.list_documents_for_project(project_id)?;
    tracing::info!(project_id, documents = docs.len(), "Reindexing project");
    Ok(reindex_documents(store, docs))
}

/// Removes postings whose documents are gone, then refreshes planner statistics
pub fn optimize<S: Store>(store: &mut S) -> std::result::Result<OptimizeSummary, StorageError> {
    let orphans_removed = store.delete_orphan_postings()?;
    store.analyze()?;
    tracing::info!(orphans_removed, "Index optimized");
    Ok(OptimizeSummary { orphans_removed })
}
