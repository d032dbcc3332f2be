//! Text normalization and tokenization primitives.
//!
//! - [`preprocess`] lowercases and strips punctuation, digits and redundant
//!   whitespace.
//! - [`word_tokens`] splits on word-character runs.
//! - [`tokenize`] additionally drops stop-words and short tokens and reduces
//!   each token to its noun lemma via [`lemmatize`].
//!
//! Token order is preserved everywhere: keyword scoring counts repeated
//! tokens, so a set would lose information.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid regex"));

/// Standard English stop-word list.
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Irregular plurals that suffix rules would get wrong.
static NOUN_EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("people", "people"),
        ("analyses", "analysis"),
        ("crises", "crisis"),
        ("theses", "thesis"),
        ("hypotheses", "hypothesis"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("data", "datum"),
        ("indices", "index"),
        ("matrices", "matrix"),
        ("appendices", "appendix"),
        ("series", "series"),
        ("species", "species"),
        ("news", "news"),
        ("means", "means"),
        ("lives", "life"),
        ("wives", "wife"),
        ("knives", "knife"),
        ("leaves", "leaf"),
        ("halves", "half"),
        ("shelves", "shelf"),
    ]
    .into_iter()
    .collect()
});

/// Lowercase, replace non-word characters and digit runs with spaces,
/// collapse whitespace and trim.
pub fn preprocess(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lowered = text.to_lowercase();
    let no_punct = NON_WORD.replace_all(&lowered, " ");
    let no_digits = DIGITS.replace_all(&no_punct, " ");
    WHITESPACE.replace_all(&no_digits, " ").trim().to_string()
}

/// Word-character runs in order of appearance.
pub fn word_tokens(text: &str) -> impl Iterator<Item = &str> {
    WORD.find_iter(text).map(|m| m.as_str())
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

/// Tokens longer than two characters that are not stop-words, each reduced
/// to its lemma. Expects preprocessed (lowercase) input.
pub fn tokenize(text: &str) -> Vec<String> {
    word_tokens(text)
        .filter(|t| t.chars().count() > 2 && !is_stop_word(t))
        .map(lemmatize)
        .collect()
}

/// Reduce a lowercase token to its singular noun form.
pub fn lemmatize(token: &str) -> String {
    if let Some(lemma) = NOUN_EXCEPTIONS.get(token) {
        return (*lemma).to_string();
    }
    if token.chars().count() <= 3 {
        return token.to_string();
    }
    if ["ics", "ss", "us", "is"].iter().any(|s| token.ends_with(s)) {
        return token.to_string();
    }
    if let Some(stem) = token.strip_suffix("ies") {
        if stem.chars().count() >= 2 {
            return format!("{}y", stem);
        }
    }
    if ["sses", "xes", "ches", "shes", "zzes"]
        .iter()
        .any(|s| token.ends_with(s))
    {
        return token[..token.len() - 2].to_string();
    }
    match token.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => token.to_string(),
    }
}
