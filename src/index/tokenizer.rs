//! Text tokenization for indexing
//!
//! Turns extracted page text into the terms stored in the search index.
//! The pipeline is deliberately simple: lowercase, decode the handful of
//! HTML entities that survive extraction, strip punctuation except
//! apostrophes, then filter out noise tokens and stop words.

use crate::index::stopwords::is_index_stop_word;

/// Minimum term length in characters
pub const MIN_TERM_LENGTH: usize = 2;

/// Maximum term length in characters
pub const MAX_TERM_LENGTH: usize = 50;

/// Decodes the HTML entities commonly left over in extracted text
///
/// `&amp;` is decoded last so that double-encoded input stays
/// single-decoded.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Tokenizes text into indexable terms
///
/// # Arguments
///
/// * `text` - Raw field text (title, description, or body)
///
/// # Returns
///
/// Lowercased terms with punctuation stripped, in source order. Tokens
/// shorter than 2 or longer than 50 characters, purely numeric tokens,
/// and stop words are dropped. Apostrophes inside a word are kept
/// (`l'installation` stays one term) but trimmed from the edges.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = decode_entities(&text.to_lowercase());

    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .map(|word| word.trim_matches('\''))
        .filter(|word| {
            let length = word.chars().count();
            if length < MIN_TERM_LENGTH || length > MAX_TERM_LENGTH {
                return false;
            }
            if word.chars().all(|c| c.is_ascii_digit()) {
                return false;
            }
            !is_index_stop_word(word)
        })
        .map(|word| word.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokenization() {
        let terms = tokenize("Installation du logiciel sur le serveur");
        assert_eq!(terms, vec!["installation", "logiciel", "serveur"]);
    }

    #[test]
    fn test_punctuation_becomes_separator() {
        let terms = tokenize("config.yaml, réseau/proxy: activé!");
        assert_eq!(terms, vec!["config", "yaml", "réseau", "proxy", "activé"]);
    }

    #[test]
    fn test_inner_apostrophe_kept_edges_trimmed() {
        let terms = tokenize("'l'installation'");
        assert_eq!(terms, vec!["l'installation"]);
    }

    #[test]
    fn test_numeric_tokens_dropped() {
        let terms = tokenize("version 2024 du serveur v2");
        assert_eq!(terms, vec!["version", "serveur", "v2"]);
    }

    #[test]
    fn test_length_bounds() {
        let long = "a".repeat(51);
        let max = "b".repeat(50);
        let text = format!("x ab {} {}", long, max);
        let terms = tokenize(&text);
        assert_eq!(terms, vec!["ab".to_string(), max]);
    }

    #[test]
    fn test_entities_decoded() {
        // &#39; becomes an apostrophe, &nbsp; a separator
        let terms = tokenize("d&#39;abord&nbsp;ensuite");
        assert_eq!(terms, vec!["d'abord", "ensuite"]);
    }

    #[test]
    fn test_double_encoded_ampersand_not_double_decoded() {
        // &amp;lt; decodes to the literal text "&lt;" which strips to "lt"
        let terms = tokenize("foo &amp;lt; bar");
        assert_eq!(terms, vec!["foo", "lt", "bar"]);
    }

    #[test]
    fn test_stop_words_filtered_in_both_languages() {
        let terms = tokenize("the guide pour les serveurs and more");
        assert_eq!(terms, vec!["guide", "serveurs", "more"]);
    }

    #[test]
    fn test_accented_terms_survive() {
        let terms = tokenize("Sécurité réseau éprouvée");
        assert_eq!(terms, vec!["sécurité", "réseau", "éprouvée"]);
    }
}
