//! Relevance scoring
//!
//! A [`Scorer`] is chosen once per session from the matching configuration:
//! a regex pattern wins over everything else, then TF-IDF when enabled, and
//! exact keyword matching otherwise.

mod tfidf;
mod tokenizer;

pub use tfidf::{RelevanceState, TfIdfScorer, BOOTSTRAP_DOCUMENTS};
pub use tokenizer::{matched_keywords, parse_keyword_input, Tokenizer};

use crate::config::MatchingConfig;
use crate::state::ResultRecord;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Most distinct regex matches recorded per page
const MAX_RECORDED_MATCHES: usize = 10;

/// Result of scoring one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub score: f64,
    pub relevant: bool,
}

impl Assessment {
    fn irrelevant() -> Self {
        Self {
            score: 0.0,
            relevant: false,
        }
    }
}

/// Relevance strategy for a crawl session
#[derive(Debug, Clone)]
pub enum Scorer {
    /// Case-insensitive pattern match: 1.0 or 0.0
    Regex(Regex),
    /// Any keyword's terms intersect the page's terms: 1.0 or 0.0
    Exact {
        keywords: Vec<String>,
        keyword_terms: Vec<HashSet<String>>,
        tokenizer: Tokenizer,
    },
    /// Incremental TF-IDF heuristic
    TfIdf {
        keywords: Vec<String>,
        scorer: TfIdfScorer,
    },
}

impl Scorer {
    /// Selects and builds the strategy for `keywords` under `matching`
    pub fn from_settings(keywords: &[String], matching: &MatchingConfig) -> Result<Self, regex::Error> {
        if let Some(pattern) = matching.regex_pattern.as_deref().filter(|p| !p.is_empty()) {
            let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
            return Ok(Self::Regex(regex));
        }

        let tokenizer = Tokenizer::new(
            matching.remove_stopwords,
            matching.use_stemming,
            matching.use_lemmatization,
        );

        if matching.use_tfidf {
            return Ok(Self::TfIdf {
                keywords: keywords.to_vec(),
                scorer: TfIdfScorer::new(keywords, tokenizer, matching.min_relevance_score),
            });
        }

        Ok(Self::Exact {
            keywords: keywords.to_vec(),
            keyword_terms: keywords.iter().map(|k| tokenizer.keyword_terms(k)).collect(),
            tokenizer,
        })
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Regex(_) => "regex",
            Self::Exact { .. } => "exact",
            Self::TfIdf { .. } => "tf-idf",
        }
    }

    /// Returns true if results should be rescored and ordered by score
    pub fn uses_tfidf(&self) -> bool {
        matches!(self, Self::TfIdf { .. })
    }

    /// Scores a page's text
    ///
    /// TF-IDF scoring also updates `relevance`. Empty text is never relevant
    /// and never counted.
    pub fn assess(&self, text: &str, relevance: &mut RelevanceState) -> Assessment {
        if text.trim().is_empty() {
            return Assessment::irrelevant();
        }

        match self {
            Self::Regex(regex) => binary(regex.is_match(text)),
            Self::Exact {
                keyword_terms,
                tokenizer,
                ..
            } => {
                let page_terms = tokenizer.term_set(text);
                binary(
                    keyword_terms
                        .iter()
                        .any(|terms| !terms.is_disjoint(&page_terms)),
                )
            }
            Self::TfIdf { scorer, .. } => {
                let score = scorer.score(text, relevance);
                Assessment {
                    score,
                    relevant: scorer.is_relevant(score),
                }
            }
        }
    }

    /// Keywords (or, for a pattern, distinct matches) found in `text`
    pub fn matched_keywords(&self, text: &str) -> Vec<String> {
        match self {
            Self::Regex(regex) => {
                let mut seen = Vec::new();
                for m in regex.find_iter(text) {
                    let found = m.as_str().to_lowercase();
                    if !seen.contains(&found) {
                        seen.push(found);
                    }
                    if seen.len() >= MAX_RECORDED_MATCHES {
                        break;
                    }
                }
                seen
            }
            Self::Exact { keywords, .. } | Self::TfIdf { keywords, .. } => {
                matched_keywords(text, keywords)
            }
        }
    }

    /// Rescores retained results against current statistics and orders them by
    /// score; a no-op for non-TF-IDF strategies
    pub fn rescore(&self, results: &mut [ResultRecord], relevance: &RelevanceState) {
        if let Self::TfIdf { scorer, .. } = self {
            scorer.rescore(results, relevance);
        }
    }
}

fn binary(matched: bool) -> Assessment {
    Assessment {
        score: if matched { 1.0 } else { 0.0 },
        relevant: matched,
    }
}
