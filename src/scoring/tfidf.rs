//! Incremental TF-IDF relevance heuristic
//!
//! Document frequencies are accumulated as pages are scored, so early scores
//! are computed against thin statistics. Until [`BOOTSTRAP_DOCUMENTS`] pages
//! have been seen a plain keyword-coverage ratio is used instead, and a
//! periodic rescoring pass brings older results up to date.

use crate::scoring::tokenizer::{matched_keywords, Tokenizer};
use crate::state::ResultRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Documents needed before TF-IDF replaces the coverage ratio
pub const BOOTSTRAP_DOCUMENTS: u64 = 10;

/// Divisor that maps raw TF-IDF sums into roughly [0, 1]
const SCORE_SCALE: f64 = 10.0;

/// Corpus statistics accumulated across scored documents
///
/// `total_documents` always equals the number of documents whose terms were
/// added to `document_frequencies`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevanceState {
    #[serde(default)]
    pub document_frequencies: BTreeMap<String, u64>,
    #[serde(default)]
    pub total_documents: u64,
}

impl RelevanceState {
    /// Adds one document's terms to the statistics
    ///
    /// Documents with no terms are not counted.
    pub fn observe(&mut self, terms: &[String]) {
        if terms.is_empty() {
            return;
        }

        let distinct: HashSet<&String> = terms.iter().collect();
        for term in distinct {
            *self.document_frequencies.entry(term.clone()).or_insert(0) += 1;
        }
        self.total_documents += 1;
    }

    /// Number of documents containing `term`, at least 1
    pub fn document_frequency(&self, term: &str) -> u64 {
        self.document_frequencies
            .get(term)
            .copied()
            .unwrap_or(0)
            .max(1)
    }

    /// Smoothed inverse document frequency
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.total_documents.max(2) as f64;
        (n / self.document_frequency(term) as f64).ln()
    }
}

/// Scores documents with incremental TF-IDF
#[derive(Debug, Clone)]
pub struct TfIdfScorer {
    keywords: Vec<String>,
    keyword_terms: Vec<HashSet<String>>,
    tokenizer: Tokenizer,
    min_relevance_score: f64,
}

impl TfIdfScorer {
    pub fn new(keywords: &[String], tokenizer: Tokenizer, min_relevance_score: f64) -> Self {
        let keyword_terms = keywords
            .iter()
            .map(|keyword| tokenizer.keyword_terms(keyword))
            .collect();

        Self {
            keywords: keywords.to_vec(),
            keyword_terms,
            tokenizer,
            min_relevance_score,
        }
    }

    /// Scores `text` and then adds it to the corpus statistics
    pub fn score(&self, text: &str, relevance: &mut RelevanceState) -> f64 {
        let terms = self.tokenizer.tokenize(text);
        let score = self.compute(text, &terms, relevance);
        relevance.observe(&terms);
        score
    }

    /// Scores `text` against the current statistics without changing them
    pub fn score_readonly(&self, text: &str, relevance: &RelevanceState) -> f64 {
        let terms = self.tokenizer.tokenize(text);
        self.compute(text, &terms, relevance)
    }

    /// Returns true if a score passes the relevance threshold
    pub fn is_relevant(&self, score: f64) -> bool {
        score > 0.0 && score >= self.min_relevance_score
    }

    fn compute(&self, text: &str, terms: &[String], relevance: &RelevanceState) -> f64 {
        if self.keywords.is_empty() {
            return 0.0;
        }

        if relevance.total_documents < BOOTSTRAP_DOCUMENTS {
            let found = matched_keywords(text, &self.keywords).len();
            return (found as f64 / self.keywords.len() as f64).clamp(0.0, 1.0);
        }

        if terms.is_empty() {
            return 0.0;
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for term in terms {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }

        let keyword_scores: Vec<f64> = self
            .keyword_terms
            .iter()
            .filter_map(|kw_terms| {
                let weights: Vec<f64> = kw_terms
                    .iter()
                    .filter_map(|term| {
                        let tf = *counts.get(term.as_str())? as f64;
                        Some(tf * relevance.idf(term))
                    })
                    .collect();

                if weights.is_empty() {
                    None
                } else {
                    Some(weights.iter().sum::<f64>() / weights.len() as f64)
                }
            })
            .collect();

        if keyword_scores.is_empty() {
            return 0.0;
        }

        let average = keyword_scores.iter().sum::<f64>() / keyword_scores.len() as f64;
        (average / SCORE_SCALE).clamp(0.0, 1.0)
    }

    /// Recomputes every result's score from its retained content, then sorts
    /// results by score, highest first
    ///
    /// Statistics are only read. Results without retained content keep their
    /// score. The sort is stable, so equal scores keep discovery order.
    pub fn rescore(&self, results: &mut [ResultRecord], relevance: &RelevanceState) {
        for result in results.iter_mut() {
            if let Some(content) = &result.content {
                result.relevance_score = self.score_readonly(content, relevance);
            }
        }

        results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    }
}
