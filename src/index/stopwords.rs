//! Stop-word lists
//!
//! Crawled content is mostly French with English mixed in, so indexing
//! filters against both lists. Query analysis only filters the short
//! French list to keep recall high for short queries.

/// French stop words excluded from the index
const FRENCH_STOP_WORDS: &[&str] = &[
    "le", "de", "et", "à", "un", "il", "être", "en", "avoir", "que", "pour", "dans", "ce", "son",
    "une", "sur", "avec", "ne", "se", "pas", "tout", "plus", "par", "grand", "comme", "mais",
    "premier", "vous", "ou", "nous", "faire", "du", "aller", "voir", "temps", "petit", "la",
    "les", "des", "au", "aux", "ces", "cette", "ses", "mes", "tes", "nos", "vos", "leurs", "mon",
    "ton", "ma", "ta", "sa", "notre", "votre", "leur", "je", "tu", "elle", "ils", "elles", "me",
    "te", "moi", "toi", "lui", "eux", "qui", "quoi", "dont", "où", "quand", "comment",
    "pourquoi", "quel", "quelle", "quels", "quelles", "lequel", "laquelle", "lesquels",
    "lesquelles",
];

/// English stop words excluded from the index (common in mixed-language pages)
const ENGLISH_STOP_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "it", "for", "not", "on", "with",
    "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we", "say",
    "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their", "what",
    "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when", "make", "can",
    "like", "time", "no", "just", "him", "know", "take", "people", "into", "year", "your",
    "good", "some", "could", "them", "see", "other", "than", "then", "now", "look", "only",
    "come", "its", "over", "think", "also", "back", "after", "use", "two", "how", "our", "work",
    "first", "well", "way", "even", "new", "want", "because", "any", "these", "give", "day",
    "most", "us",
];

/// French stop words excluded from query terms
///
/// Deliberately much shorter than the indexing list: queries are short,
/// so dropping too many words would leave nothing to search for.
const QUERY_STOP_WORDS: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "du", "de", "et", "ou", "est", "sont", "avec", "pour",
];

/// Returns true if the word should be excluded from the term index
pub fn is_index_stop_word(word: &str) -> bool {
    FRENCH_STOP_WORDS.contains(&word) || ENGLISH_STOP_WORDS.contains(&word)
}

/// Returns true if the word should be excluded from query terms
pub fn is_query_stop_word(word: &str) -> bool {
    QUERY_STOP_WORDS.contains(&word)
}

/// Returns true if the word looks like an English stop word
///
/// Used by the query analyzer for its crude language vote.
pub fn is_english_stop_word(word: &str) -> bool {
    ENGLISH_STOP_WORDS.contains(&word)
}
