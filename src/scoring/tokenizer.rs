//! Keyword normalization: tokenizing page text and keyword input the same way
//!
//! The pipeline is lowercase → split on non-word characters → stopword
//! removal → stemming → lemmatization, with the last three steps optional.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

/// Common English words dropped when stopword removal is enabled
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Irregular plural nouns folded by the lemmatizer
const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("men", "man"),
    ("mice", "mouse"),
    ("people", "person"),
    ("teeth", "tooth"),
    ("women", "woman"),
    ("data", "datum"),
    ("indices", "index"),
    ("analyses", "analysis"),
];

/// Splits raw keyword input into normalized keywords
///
/// Input containing a comma is split on commas (so multi-word keywords
/// survive); otherwise it is split on whitespace. Keywords are trimmed,
/// lowercased, and empty entries dropped.
pub fn parse_keyword_input(input: &str) -> Vec<String> {
    let parts: Vec<&str> = if input.contains(',') {
        input.split(',').collect()
    } else {
        input.split_whitespace().collect()
    };

    parts
        .into_iter()
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Returns the keywords that occur in `text` as case-insensitive substrings,
/// in keyword order
pub fn matched_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| {
            let needle = keyword.to_lowercase();
            !needle.is_empty() && haystack.contains(&needle)
        })
        .cloned()
        .collect()
}

/// Configurable text → terms pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tokenizer {
    pub remove_stopwords: bool,
    pub stem: bool,
    pub lemmatize: bool,
}

impl Tokenizer {
    pub fn new(remove_stopwords: bool, stem: bool, lemmatize: bool) -> Self {
        Self {
            remove_stopwords,
            stem,
            lemmatize,
        }
    }

    /// Produces the term sequence for `text`, duplicates preserved
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let stemmer = self.stem.then(|| Stemmer::create(Algorithm::English));

        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|word| !word.is_empty())
            .filter(|word| !(self.remove_stopwords && STOPWORDS.contains(word)))
            .map(|word| match &stemmer {
                Some(stemmer) => stemmer.stem(word).into_owned(),
                None => word.to_string(),
            })
            .map(|word| if self.lemmatize { lemmatize(&word) } else { word })
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// Distinct terms of `text`
    pub fn term_set(&self, text: &str) -> HashSet<String> {
        self.tokenize(text).into_iter().collect()
    }

    /// Terms for a keyword; a keyword that tokenizes to nothing (e.g. a bare
    /// stopword) falls back to its lowercase form
    pub fn keyword_terms(&self, keyword: &str) -> HashSet<String> {
        let terms = self.term_set(keyword);
        if terms.is_empty() {
            HashSet::from([keyword.trim().to_lowercase()])
        } else {
            terms
        }
    }
}

/// Folds English noun inflections onto their base form
fn lemmatize(word: &str) -> String {
    if let Some((_, base)) = IRREGULAR_NOUNS.iter().find(|(plural, _)| *plural == word) {
        return base.to_string();
    }

    if word.len() <= 3 || !word.ends_with('s') {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{}y", stem);
        }
    }

    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }

    word[..word.len() - 1].to_string()
}
