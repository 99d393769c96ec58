//! Result enrichment
//!
//! Decorates raw candidates for display: `<mark>` highlighting, a contextual
//! snippet around the earliest term match, an estimated reading time, and a
//! small editorial quality assessment with French-language factor labels.

use regex::Regex;
use serde::Serialize;

use super::analyzer::QueryTerm;

/// Snippet window pulled in front of the earliest term match, in characters
const SNIPPET_LEAD: usize = 100;
/// Words per minute assumed by the reading time estimate
const READING_SPEED: u64 = 200;

/// Estimated reading time of a document
#[derive(Debug, Clone, Serialize)]
pub struct ReadingTime {
    pub words: u64,
    pub minutes: u64,
    /// Display string, e.g. "3 min de lecture"
    pub text: String,
}

/// Editorial quality assessment of a result
#[derive(Debug, Clone, Serialize)]
pub struct ContentQuality {
    /// 0 to 5
    pub score: u32,
    /// Human-readable reasons for the score
    pub factors: Vec<String>,
}

/// Wraps whole-word term matches in `<mark>` tags
///
/// Matching is case-insensitive and the original casing is preserved. Terms
/// shorter than two characters are skipped.
pub fn highlight_terms(text: &str, terms: &[QueryTerm]) -> String {
    let mut highlighted = text.to_string();
    for term in terms {
        if term.term.chars().count() < 2 {
            continue;
        }
        let pattern = format!(r"(?i)\b{}\b", regex::escape(&term.term));
        if let Ok(re) = Regex::new(&pattern) {
            highlighted = re.replace_all(&highlighted, "<mark>$0</mark>").into_owned();
        }
    }
    highlighted
}

/// Builds a highlighted snippet centered on the earliest term match
///
/// The window starts up to [`SNIPPET_LEAD`] characters before the first match
/// and spans `max_length` characters. Edges that cut into the content are
/// trimmed to word boundaries and marked with an ellipsis. Without terms (or
/// without content) the snippet is simply the head of the content.
pub fn snippet(content: &str, terms: &[QueryTerm], max_length: usize) -> String {
    if terms.is_empty() || content.is_empty() {
        let head: String = content.chars().take(max_length).collect();
        return format!("{head}...");
    }

    let lowered = content.to_lowercase();
    let mut first_pos: Option<usize> = None;
    for term in terms {
        if let Some(byte_pos) = lowered.find(&term.term) {
            let char_pos = lowered[..byte_pos].chars().count();
            if first_pos.map_or(true, |current| char_pos < current) {
                first_pos = Some(char_pos);
            }
        }
    }

    let start = first_pos.unwrap_or(0).saturating_sub(SNIPPET_LEAD);
    let mut snippet: String = content.chars().skip(start).take(max_length).collect();

    if start > 0 {
        if let Some(space) = snippet.find(' ') {
            snippet = snippet[space + 1..].to_string();
        }
        snippet = format!("...{snippet}");
    }

    if content.chars().count() > start + max_length {
        if let Some(space) = snippet.rfind(' ') {
            snippet.truncate(space);
        }
        snippet.push_str("...");
    }

    highlight_terms(&snippet, terms)
}

/// Estimates reading time at [`READING_SPEED`] words per minute
pub fn reading_time(content: &str) -> ReadingTime {
    let words = content.split_whitespace().count() as u64;
    let minutes = words.div_ceil(READING_SPEED);
    ReadingTime {
        words,
        minutes,
        text: format!("{minutes} min de lecture"),
    }
}

/// Scores a result's editorial quality on a 0 to 5 scale
pub fn content_quality(
    title: Option<&str>,
    description: Option<&str>,
    content: &str,
) -> ContentQuality {
    let mut score = 0u32;
    let mut factors = Vec::new();

    let title_len = title.map_or(0, |t| t.chars().count());
    if (30..=60).contains(&title_len) {
        score += 2;
        factors.push("Titre bien dimensionné".to_string());
    }
    if description.map_or(false, |d| !d.is_empty()) {
        score += 1;
        factors.push("Description présente".to_string());
    }

    let content_len = content.chars().count();
    if content_len > 500 {
        score += 1;
        factors.push("Contenu substantiel".to_string());
    }
    if content_len > 2000 {
        score += 1;
        factors.push("Contenu détaillé".to_string());
    }

    ContentQuality {
        score: score.min(5),
        factors,
    }
}
