//! Search execution
//!
//! Retrieval is deliberately coarse: storage returns every document matching
//! at least one term or phrase as a substring, and ranking happens here in
//! memory. Queries that yield no usable terms (or a failing retrieval) drop
//! to a basic substring search ordered by recency.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::storage::{SearchCandidate, SearchFilters, Store};
use crate::{LoupeError, Result};

use super::analyzer::{analyze, QueryAnalysis};
use super::enrich::{
    content_quality, highlight_terms, reading_time, snippet, ContentQuality, ReadingTime,
};
use super::scorer::{relevance_score, ScoreBreakdown};
use super::suggest;

/// How many rows the basic search path retrieves before paginating in memory
const FALLBACK_LIMIT: u32 = 1000;
/// How many site facet buckets are reported
const SITE_FACET_LIMIT: u32 = 10;

/// Result orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Score descending, most recently indexed first on ties
    #[default]
    Relevance,
    /// Most recently indexed first
    Date,
    /// Title A to Z, untitled documents first
    Title,
    /// Link authority descending, then quality
    Pagerank,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "date" => Ok(Self::Date),
            "title" => Ok(Self::Title),
            "pagerank" => Ok(Self::Pagerank),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Knobs for one search call
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub project_id: Option<i64>,
    pub content_type: Option<String>,
    pub site_id: Option<i64>,
    pub language: Option<String>,
    /// Inclusive lower bound on the indexing date (YYYY-MM-DD)
    pub date_from: Option<String>,
    /// Inclusive upper bound on the indexing date (YYYY-MM-DD)
    pub date_to: Option<String>,
    pub sort: SortOrder,
    /// 1-based page number; 0 is treated as 1
    pub page: u32,
    /// Page size; None uses the configured default
    pub per_page: Option<u32>,
    pub include_synonyms: bool,
    /// Treat the whole query as one quoted phrase
    pub exact_phrase: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            project_id: None,
            content_type: None,
            site_id: None,
            language: None,
            date_from: None,
            date_to: None,
            sort: SortOrder::default(),
            page: 1,
            per_page: None,
            include_synonyms: true,
            exact_phrase: false,
        }
    }
}

/// One facet bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// Facet blocks returned alongside results
///
/// A failing facet query degrades to an empty block instead of failing the
/// whole search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Facets {
    pub content_types: Vec<FacetCount>,
    pub projects: Vec<FacetCount>,
    pub sites: Vec<FacetCount>,
}

/// One display-ready search result
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedResult {
    pub url: String,
    pub title: Option<String>,
    pub highlighted_title: Option<String>,
    pub description: Option<String>,
    pub highlighted_description: Option<String>,
    pub snippet: String,
    pub domain: String,
    pub project_name: String,
    pub content_type: String,
    pub language: String,
    pub indexed_at: String,
    pub score_breakdown: ScoreBreakdown,
    pub reading_time: ReadingTime,
    pub content_quality: ContentQuality,
}

/// Complete response for one search call
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_results: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub results: Vec<EnrichedResult>,
    pub facets: Facets,
    pub suggestions: Vec<String>,
    pub analysis: QueryAnalysis,
    pub elapsed_ms: u64,
}

/// Runs a search end to end
///
/// Analyzes the query, retrieves and ranks candidates, paginates, and
/// decorates the requested page with highlights, snippets, and scores.
///
/// # Arguments
///
/// * `store` - Storage backend to search
/// * `config` - Pagination and snippet settings
/// * `raw_query` - The query as typed by the user
/// * `options` - Filters, sorting, and pagination
///
/// # Returns
///
/// * `Ok(SearchResponse)` - Results plus facets, suggestions, and analysis
/// * `Err(LoupeError::EmptyQuery)` - The query was blank
pub fn execute<S: Store>(
    store: &S,
    config: &SearchConfig,
    raw_query: &str,
    options: &SearchOptions,
) -> Result<SearchResponse> {
    let started = Instant::now();

    let trimmed = raw_query.trim();
    if trimmed.is_empty() {
        return Err(LoupeError::EmptyQuery);
    }

    let query = if options.exact_phrase && !trimmed.contains('"') {
        format!("\"{trimmed}\"")
    } else {
        trimmed.to_string()
    };
    let analysis = analyze(&query, options.include_synonyms);

    let page = options.page.max(1);
    let per_page = options
        .per_page
        .unwrap_or(config.default_per_page)
        .clamp(1, config.max_per_page);

    let filters = SearchFilters {
        project_id: options.project_id,
        content_type: options.content_type.clone(),
        site_id: options.site_id,
        language: options.language.clone(),
        date_from: options.date_from.clone(),
        date_to: options.date_to.clone(),
    };

    let scored = if analysis.terms.is_empty() && analysis.phrases.is_empty() {
        basic_search(store, &analysis, &filters)?
    } else {
        let mut patterns: Vec<String> = analysis
            .terms
            .iter()
            .map(|term| format!("%{}%", term.term))
            .collect();
        patterns.extend(analysis.phrases.iter().map(|phrase| format!("%{phrase}%")));

        match store.search_candidates(&patterns, &filters) {
            Ok(candidates) => {
                let mut scored: Vec<(SearchCandidate, f64)> = candidates
                    .into_iter()
                    .map(|candidate| {
                        let score = relevance_score(&candidate, &analysis);
                        (candidate, score)
                    })
                    .collect();
                sort_candidates(&mut scored, options.sort);
                scored
            }
            Err(e) => {
                warn!("Candidate retrieval failed, falling back to basic search: {e}");
                basic_search(store, &analysis, &filters)?
            }
        }
    };

    let total_results = scored.len();
    let total_pages = (total_results as u32).div_ceil(per_page);
    let offset = (page as usize - 1) * per_page as usize;

    let results: Vec<EnrichedResult> = scored
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .map(|(candidate, score)| enrich(candidate, score, &analysis, config))
        .collect();

    let facets = collect_facets(store, options.project_id);
    let suggestions = match suggest::suggestions(store, trimmed, options.project_id) {
        Ok(list) => list,
        Err(e) => {
            warn!("Suggestion lookup failed: {e}");
            Vec::new()
        }
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    debug!(total_results, elapsed_ms, "Search complete");

    Ok(SearchResponse {
        query: trimmed.to_string(),
        total_results,
        page,
        per_page,
        total_pages,
        results,
        facets,
        suggestions,
        analysis,
        elapsed_ms,
    })
}

/// Basic substring search over the cleaned query, newest first
///
/// Used when analysis produced nothing searchable or the ranked retrieval
/// failed. Falls back to the raw query when cleaning stripped every
/// character, so a punctuation-only query cannot match the whole corpus.
/// Every hit gets a flat relevance of 1.0 and the requested sort order is
/// ignored.
fn basic_search<S: Store>(
    store: &S,
    analysis: &QueryAnalysis,
    filters: &SearchFilters,
) -> Result<Vec<(SearchCandidate, f64)>> {
    let needle = if analysis.cleaned_query.is_empty() {
        analysis.original_query.trim()
    } else {
        analysis.cleaned_query.as_str()
    };
    let pattern = format!("%{needle}%");
    let candidates = store.fallback_candidates(&pattern, filters, FALLBACK_LIMIT)?;
    debug!(candidates = candidates.len(), "Basic search path");
    Ok(candidates
        .into_iter()
        .map(|candidate| (candidate, 1.0))
        .collect())
}

/// Orders scored candidates in place
///
/// Sorting is stable, so documents that compare equal keep their retrieval
/// order.
fn sort_candidates(scored: &mut [(SearchCandidate, f64)], sort: SortOrder) {
    match sort {
        SortOrder::Relevance => scored.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| b.0.indexed_at.cmp(&a.0.indexed_at))
        }),
        SortOrder::Date => scored.sort_by(|a, b| b.0.indexed_at.cmp(&a.0.indexed_at)),
        SortOrder::Title => scored.sort_by(|a, b| a.0.title.cmp(&b.0.title)),
        SortOrder::Pagerank => scored.sort_by(|a, b| {
            b.0.pagerank_score
                .total_cmp(&a.0.pagerank_score)
                .then_with(|| b.0.quality_score.total_cmp(&a.0.quality_score))
        }),
    }
}

fn enrich(
    candidate: SearchCandidate,
    score: f64,
    analysis: &QueryAnalysis,
    config: &SearchConfig,
) -> EnrichedResult {
    let highlighted_title = candidate
        .title
        .as_deref()
        .map(|title| highlight_terms(title, &analysis.terms));
    let highlighted_description = candidate
        .description
        .as_deref()
        .map(|description| highlight_terms(description, &analysis.terms));
    let snippet_text = snippet(&candidate.content, &analysis.terms, config.snippet_length);
    let quality = content_quality(
        candidate.title.as_deref(),
        candidate.description.as_deref(),
        &candidate.content,
    );
    let reading = reading_time(&candidate.content);
    let breakdown = ScoreBreakdown::new(score, candidate.pagerank_score, candidate.quality_score);

    EnrichedResult {
        url: candidate.url,
        title: candidate.title,
        highlighted_title,
        description: candidate.description,
        highlighted_description,
        snippet: snippet_text,
        domain: candidate.domain,
        project_name: candidate.project_name,
        content_type: candidate.content_type,
        language: candidate.language,
        indexed_at: candidate.indexed_at,
        score_breakdown: breakdown,
        reading_time: reading,
        content_quality: quality,
    }
}

fn collect_facets<S: Store>(store: &S, project_id: Option<i64>) -> Facets {
    let content_types = match store.facet_content_types(project_id) {
        Ok(rows) => to_facet_counts(rows),
        Err(e) => {
            warn!("Content type facet failed: {e}");
            Vec::new()
        }
    };
    let projects = match store.facet_projects() {
        Ok(rows) => to_facet_counts(rows),
        Err(e) => {
            warn!("Project facet failed: {e}");
            Vec::new()
        }
    };
    let sites = match store.facet_sites(project_id, SITE_FACET_LIMIT) {
        Ok(rows) => to_facet_counts(rows),
        Err(e) => {
            warn!("Site facet failed: {e}");
            Vec::new()
        }
    };

    Facets {
        content_types,
        projects,
        sites,
    }
}

fn to_facet_counts(rows: Vec<(String, u64)>) -> Vec<FacetCount> {
    rows.into_iter()
        .map(|(value, count)| FacetCount { value, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlSettings;
    use crate::index::index_document;
    use crate::storage::{NewDocument, SqliteStorage};
    use crate::url::url_hash;

    fn seeded_storage() -> (SqliteStorage, i64, i64) {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let project_id = storage
            .create_project(
                "demo",
                &["example.com".to_string()],
                &CrawlSettings::default(),
            )
            .unwrap();
        let site_id = storage
            .create_site(project_id, "example.com", "https://example.com/")
            .unwrap();
        (storage, project_id, site_id)
    }

    fn document(project_id: i64, site_id: i64, url: &str) -> NewDocument {
        NewDocument {
            project_id,
            site_id,
            url: url.to_string(),
            url_hash: url_hash(url),
            content_type: "webpage".to_string(),
            title: None,
            description: None,
            content: String::new(),
            language: "fr".to_string(),
            file_size: 0,
            quality_score: 0.5,
            metadata: None,
        }
    }

    fn search(storage: &SqliteStorage, query: &str, options: &SearchOptions) -> SearchResponse {
        execute(storage, &SearchConfig::default(), query, options).unwrap()
    }

    #[test]
    fn test_blank_query_rejected() {
        let (storage, _, _) = seeded_storage();
        let err = execute(
            &storage,
            &SearchConfig::default(),
            "   ",
            &SearchOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoupeError::EmptyQuery));
    }

    #[test]
    fn test_title_match_ranks_above_body_match() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut in_body = document(project_id, site_id, "https://example.com/blog");
        in_body.title = Some("Journal du projet".to_string());
        in_body.content = "Le moteur est mentionné dans le texte".to_string();
        storage.insert_document(&in_body).unwrap();

        let mut in_title = document(project_id, site_id, "https://example.com/moteur");
        in_title.title = Some("Moteur de recherche local".to_string());
        in_title.content = "Notes sur l'indexation".to_string();
        storage.insert_document(&in_title).unwrap();

        let response = search(&storage, "moteur", &SearchOptions::default());
        assert_eq!(response.total_results, 2);
        assert_eq!(response.results[0].url, "https://example.com/moteur");
        assert!(
            response.results[0].score_breakdown.relevance
                > response.results[1].score_breakdown.relevance
        );
        assert_eq!(
            response.results[0].highlighted_title.as_deref(),
            Some("<mark>Moteur</mark> de recherche local")
        );
    }

    #[test]
    fn test_phrase_earns_bonus_in_title() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut with_phrase = document(project_id, site_id, "https://example.com/moteur");
        with_phrase.title = Some("Moteur de recherche local".to_string());
        storage.insert_document(&with_phrase).unwrap();

        let mut words_only = document(project_id, site_id, "https://example.com/autre");
        words_only.title = Some("Recherche du bon moteur".to_string());
        storage.insert_document(&words_only).unwrap();

        let response = search(
            &storage,
            "\"moteur de recherche\"",
            &SearchOptions::default(),
        );
        assert_eq!(response.analysis.phrases, vec!["moteur de recherche"]);
        assert_eq!(response.results[0].url, "https://example.com/moteur");

        let gap = response.results[0].score_breakdown.relevance
            - response.results[1].score_breakdown.relevance;
        assert!((gap - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_exact_phrase_option_quotes_the_query() {
        let (mut storage, project_id, site_id) = seeded_storage();
        let mut doc = document(project_id, site_id, "https://example.com/moteur");
        doc.title = Some("Moteur de recherche local".to_string());
        storage.insert_document(&doc).unwrap();

        let options = SearchOptions {
            exact_phrase: true,
            ..Default::default()
        };
        let response = search(&storage, "moteur de recherche", &options);
        assert_eq!(response.analysis.phrases, vec!["moteur de recherche"]);
        // The original query is echoed back unquoted
        assert_eq!(response.query, "moteur de recherche");
    }

    #[test]
    fn test_synonyms_widen_retrieval() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut direct = document(project_id, site_id, "https://example.com/recherche");
        direct.title = Some("La recherche locale".to_string());
        storage.insert_document(&direct).unwrap();

        let mut via_synonym = document(project_id, site_id, "https://example.com/trouver");
        via_synonym.title = Some("Trouver une page".to_string());
        storage.insert_document(&via_synonym).unwrap();

        let with_synonyms = search(&storage, "recherche", &SearchOptions::default());
        assert_eq!(with_synonyms.total_results, 2);

        let without = SearchOptions {
            include_synonyms: false,
            ..Default::default()
        };
        let without_synonyms = search(&storage, "recherche", &without);
        assert_eq!(without_synonyms.total_results, 1);
        assert_eq!(
            without_synonyms.results[0].url,
            "https://example.com/recherche"
        );
    }

    #[test]
    fn test_pagination_clamps_and_slices() {
        let (mut storage, project_id, site_id) = seeded_storage();
        for i in 0..3 {
            let mut doc = document(
                project_id,
                site_id,
                &format!("https://example.com/page-{i}"),
            );
            doc.title = Some(format!("Moteur {i}"));
            storage.insert_document(&doc).unwrap();
        }

        let options = SearchOptions {
            page: 0,
            per_page: Some(0),
            ..Default::default()
        };
        let response = search(&storage, "moteur", &options);
        assert_eq!(response.page, 1);
        assert_eq!(response.per_page, 1);
        assert_eq!(response.total_results, 3);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.results.len(), 1);

        let beyond = SearchOptions {
            page: 9,
            per_page: Some(2),
            ..Default::default()
        };
        let response = search(&storage, "moteur", &beyond);
        assert_eq!(response.total_pages, 2);
        assert!(response.results.is_empty());
        assert_eq!(response.total_results, 3);

        // per_page is capped by the configured maximum
        let oversized = SearchOptions {
            per_page: Some(10_000),
            ..Default::default()
        };
        let response = search(&storage, "moteur", &oversized);
        assert_eq!(response.per_page, SearchConfig::default().max_per_page);
    }

    #[test]
    fn test_stop_word_query_uses_basic_search() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut matching = document(project_id, site_id, "https://example.com/guide");
        matching.title = Some("Guide".to_string());
        matching.content = "Guide pour le moteur".to_string();
        storage.insert_document(&matching).unwrap();

        let mut other = document(project_id, site_id, "https://example.com/autre");
        other.content = "Notes sans rapport".to_string();
        storage.insert_document(&other).unwrap();

        // Both words are query stop words, so no terms survive analysis
        let response = search(&storage, "pour le", &SearchOptions::default());
        assert!(response.analysis.terms.is_empty());
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].url, "https://example.com/guide");
        assert_eq!(response.results[0].score_breakdown.relevance, 1.0);
    }

    #[test]
    fn test_punctuation_only_query_matches_literally() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut page = document(project_id, site_id, "https://example.com/page");
        page.content = "Du texte parfaitement ordinaire".to_string();
        storage.insert_document(&page).unwrap();

        // Cleaning strips every character, so the raw query is matched
        // literally instead of degenerating into a match-all pattern
        let response = search(&storage, "!!!", &SearchOptions::default());
        assert_eq!(response.analysis.cleaned_query, "");
        assert_eq!(response.total_results, 0);
    }

    #[test]
    fn test_sort_by_date_newest_first() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut older = document(project_id, site_id, "https://example.com/ancien");
        older.title = Some("Moteur ancien".to_string());
        storage.insert_document(&older).unwrap();

        let mut newer = document(project_id, site_id, "https://example.com/recent");
        newer.content = "moteur".to_string();
        storage.insert_document(&newer).unwrap();

        let options = SearchOptions {
            sort: SortOrder::Date,
            ..Default::default()
        };
        let response = search(&storage, "moteur", &options);
        assert_eq!(response.results[0].url, "https://example.com/recent");
    }

    #[test]
    fn test_sort_by_title_untitled_first() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut titled = document(project_id, site_id, "https://example.com/moteur");
        titled.title = Some("Moteur de recherche".to_string());
        storage.insert_document(&titled).unwrap();

        let mut untitled = document(project_id, site_id, "https://example.com/brut");
        untitled.content = "moteur sans titre".to_string();
        storage.insert_document(&untitled).unwrap();

        let mut journal = document(project_id, site_id, "https://example.com/journal");
        journal.title = Some("Journal du moteur".to_string());
        storage.insert_document(&journal).unwrap();

        let options = SearchOptions {
            sort: SortOrder::Title,
            ..Default::default()
        };
        let response = search(&storage, "moteur", &options);
        assert_eq!(response.results[0].title, None);
        assert_eq!(response.results[1].title.as_deref(), Some("Journal du moteur"));
        assert_eq!(
            response.results[2].title.as_deref(),
            Some("Moteur de recherche")
        );
    }

    #[test]
    fn test_sort_by_pagerank_breaks_ties_on_quality() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut low = document(project_id, site_id, "https://example.com/bas");
        low.title = Some("Moteur simple".to_string());
        low.quality_score = 0.1;
        storage.insert_document(&low).unwrap();

        let mut high = document(project_id, site_id, "https://example.com/haut");
        high.title = Some("Moteur complet".to_string());
        high.quality_score = 0.9;
        storage.insert_document(&high).unwrap();

        let options = SearchOptions {
            sort: SortOrder::Pagerank,
            ..Default::default()
        };
        let response = search(&storage, "moteur", &options);
        assert_eq!(response.results[0].url, "https://example.com/haut");
    }

    #[test]
    fn test_content_type_filter() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut page = document(project_id, site_id, "https://example.com/page");
        page.title = Some("Moteur en page".to_string());
        storage.insert_document(&page).unwrap();

        let mut image = document(project_id, site_id, "https://example.com/moteur.png");
        image.content_type = "image".to_string();
        image.title = Some("moteur".to_string());
        storage.insert_document(&image).unwrap();

        let options = SearchOptions {
            content_type: Some("image".to_string()),
            ..Default::default()
        };
        let response = search(&storage, "moteur", &options);
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].content_type, "image");
    }

    #[test]
    fn test_facets_and_suggestions_populated() {
        let (mut storage, project_id, site_id) = seeded_storage();

        let mut doc = document(project_id, site_id, "https://example.com/moteur");
        doc.title = Some("Moteur de recherche".to_string());
        doc.content = "Un moteur pour chercher".to_string();
        let document_id = storage.insert_document(&doc).unwrap();
        index_document(
            &mut storage,
            document_id,
            project_id,
            doc.title.as_deref(),
            None,
            &doc.content,
        )
        .unwrap();

        let response = search(&storage, "moteur", &SearchOptions::default());

        assert_eq!(
            response.facets.content_types,
            vec![FacetCount {
                value: "webpage".to_string(),
                count: 1
            }]
        );
        assert_eq!(response.facets.projects[0].value, "demo");
        assert_eq!(response.facets.sites[0].value, "example.com");
        assert!(response.suggestions.contains(&"moteur".to_string()));
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("relevance".parse::<SortOrder>(), Ok(SortOrder::Relevance));
        assert_eq!("Date".parse::<SortOrder>(), Ok(SortOrder::Date));
        assert_eq!("title".parse::<SortOrder>(), Ok(SortOrder::Title));
        assert_eq!("pagerank".parse::<SortOrder>(), Ok(SortOrder::Pagerank));
        assert!("alphabetical".parse::<SortOrder>().is_err());
    }
}
