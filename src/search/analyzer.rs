//! Query analysis
//!
//! Turns a raw query string into weighted terms, quoted phrases, an intent
//! guess, and a language guess. Quoted phrases are matched verbatim later,
//! but their words still become individual terms so a phrase query keeps
//! ranking documents that only contain the words separately.

use serde::Serialize;

use crate::index::{is_english_stop_word, is_index_stop_word, is_query_stop_word};

use super::synonyms::{synonyms_for, SYNONYM_WEIGHT};

/// Interrogatives that mark a query as a question
const QUESTION_WORDS: &[&str] = &[
    "qui", "que", "quoi", "où", "quand", "comment", "pourquoi", "combien",
];

/// Markers for definition-style queries
const DEFINITION_MARKERS: &[&str] = &["définition", "qu'est-ce que", "c'est quoi"];

/// How a query term entered the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    /// Typed by the user
    Term,
    /// Added by synonym expansion
    Synonym,
}

/// Coarse query intent, detected from the phrase-stripped query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    Question,
    Definition,
    Search,
}

/// A single searchable term with its scoring weight
#[derive(Debug, Clone, Serialize)]
pub struct QueryTerm {
    /// Cleaned, lowercased form used for matching
    pub term: String,
    /// Accent-folded ASCII form
    pub normalized: String,
    /// Scoring multiplier (1.0 for typed terms, less for synonyms)
    pub weight: f64,
    pub kind: TermKind,
    /// Typed term this synonym was expanded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Full analysis of a search query
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnalysis {
    pub original_query: String,
    pub cleaned_query: String,
    pub terms: Vec<QueryTerm>,
    pub phrases: Vec<String>,
    pub intent: QueryIntent,
    pub language: String,
}

/// Analyzes a raw search query
///
/// Extracts quoted phrases, splits the cleaned query into terms (dropping
/// one-character tokens and French stop words), optionally expands synonyms
/// at reduced weight, and guesses intent and language.
///
/// # Examples
///
/// ```
/// use loupe::search::{analyze, TermKind};
///
/// let analysis = analyze("guide \"moteur de recherche\"", true);
/// assert_eq!(analysis.phrases, vec!["moteur de recherche"]);
/// // Phrase words are still matched as individual terms
/// assert!(analysis.terms.iter().any(|t| t.term == "moteur"));
/// assert!(analysis
///     .terms
///     .iter()
///     .any(|t| t.kind == TermKind::Synonym && t.term == "chercher"));
/// ```
pub fn analyze(raw_query: &str, include_synonyms: bool) -> QueryAnalysis {
    let (phrases, remainder) = extract_phrases(raw_query);
    let cleaned_query = clean_query(raw_query);

    let mut terms: Vec<QueryTerm> = Vec::new();
    for token in cleaned_query.split_whitespace() {
        let word = token.trim_matches('"');
        if word.chars().count() < 2 || is_query_stop_word(word) {
            continue;
        }
        terms.push(QueryTerm {
            term: word.to_string(),
            normalized: normalize_word(word),
            weight: 1.0,
            kind: TermKind::Term,
            origin: None,
        });
    }

    if include_synonyms {
        let typed: Vec<String> = terms.iter().map(|t| t.term.clone()).collect();
        for word in &typed {
            for synonym in synonyms_for(word) {
                let normalized = normalize_word(&synonym);
                terms.push(QueryTerm {
                    term: synonym,
                    normalized,
                    weight: SYNONYM_WEIGHT,
                    kind: TermKind::Synonym,
                    origin: Some(word.clone()),
                });
            }
        }
    }

    let intent = detect_intent(&remainder);
    let language = detect_language(&cleaned_query);

    QueryAnalysis {
        original_query: raw_query.to_string(),
        cleaned_query,
        terms,
        phrases,
        intent,
        language,
    }
}

/// Splits quoted phrases out of the query
///
/// Returns the phrases in order of appearance plus the query text with the
/// quoted sections removed. An unpaired quote is dropped and the text after
/// it kept as plain words.
fn extract_phrases(query: &str) -> (Vec<String>, String) {
    let mut phrases = Vec::new();
    let mut remainder = String::with_capacity(query.len());
    let mut rest = query;

    while let Some(open) = rest.find('"') {
        remainder.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('"') {
            Some(close) => {
                let phrase = after[..close].trim();
                if !phrase.is_empty() {
                    phrases.push(phrase.to_string());
                }
                rest = &after[close + 1..];
            }
            None => {
                rest = after;
                break;
            }
        }
    }
    remainder.push_str(rest);

    (phrases, remainder)
}

/// Lowercases the query and strips characters terms cannot contain
///
/// Letters, digits, whitespace, hyphens, and double quotes survive; anything
/// else becomes a space, then whitespace runs collapse.
fn clean_query(query: &str) -> String {
    let kept: String = query
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '-' || c == '"' {
                c
            } else {
                ' '
            }
        })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Folds French accented characters to ASCII and drops the rest
fn normalize_word(word: &str) -> String {
    let mut normalized = String::with_capacity(word.len());
    for c in word.to_lowercase().chars() {
        match c {
            'à' | 'â' | 'ä' => normalized.push('a'),
            'é' | 'è' | 'ê' | 'ë' => normalized.push('e'),
            'î' | 'ï' => normalized.push('i'),
            'ô' | 'ö' => normalized.push('o'),
            'ù' | 'û' | 'ü' => normalized.push('u'),
            'ç' => normalized.push('c'),
            'œ' => normalized.push_str("oe"),
            'æ' => normalized.push_str("ae"),
            _ if c.is_ascii_alphanumeric() => normalized.push(c),
            _ => {}
        }
    }
    normalized
}

/// Substring match against the question and definition word lists
///
/// Question words win over definition markers when both match.
fn detect_intent(text: &str) -> QueryIntent {
    let lowered = text.to_lowercase();

    if QUESTION_WORDS.iter().any(|word| lowered.contains(word)) {
        return QueryIntent::Question;
    }
    if DEFINITION_MARKERS.iter().any(|word| lowered.contains(word)) {
        return QueryIntent::Definition;
    }
    QueryIntent::Search
}

/// Crude stop-word vote between French and English
fn detect_language(cleaned_query: &str) -> String {
    let mut french = 0u32;
    let mut english = 0u32;
    for token in cleaned_query.split_whitespace() {
        let word = token.trim_matches('"');
        if is_english_stop_word(word) {
            english += 1;
        } else if is_index_stop_word(word) {
            french += 1;
        }
    }

    if english > french {
        "en".to_string()
    } else {
        "fr".to_string()
    }
}
