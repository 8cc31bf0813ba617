//! Query text processing shared by the search strategies and the bulk loader.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Alphabetic}\p{N}]+").unwrap());

/// English stop list used by PostgreSQL's `english` text search configuration.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now",
];

/// Lowercased words of `text`, in order of appearance.
pub fn tokenize_text(text: &str) -> Vec<String> {
    WORD_REGEX
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn is_stopword(word: &str) -> bool {
    ENGLISH_STOPWORDS.contains(&word)
}

/// Distinct non-stopword terms of a full-text query, first occurrence first.
pub fn fulltext_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize_text(query)
        .into_iter()
        .filter(|word| !is_stopword(word))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// FTS5 `MATCH` expression requiring every term: each term is quoted, so
/// operators and column filters in user text are matched literally.
///
/// `None` when nothing but stopwords and punctuation remains.
pub fn fulltext_match_expression(query: &str) -> Option<String> {
    let terms = fulltext_terms(query);
    if terms.is_empty() {
        return None;
    }

    let quoted: Vec<String> = terms
        .iter()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();
    Some(quoted.join(" "))
}

/// Secondary search text: lowercase, runs of anything but letters and digits
/// collapsed to one space, trimmed.
pub fn normalize_search_text(text: &str) -> String {
    tokenize_text(text).join(" ")
}
