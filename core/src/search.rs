//! Query execution: phrase matching over posting lists, BM25 ranking and
//! snippet assembly.
//!
//! Scores are Okapi BM25 (k1 = 1.2, b = 0.75) summed over the query's
//! phrases. They are non-negative and higher means more relevant; callers
//! never see any other sign convention.

use crate::error::{Error, Result};
use crate::query::{Phrase, Query};
use crate::snippet::SnippetExtractor;
use crate::store::DocumentStore;
use crate::DocId;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

pub const MAX_RESULTS: usize = 20;

const K1: f64 = 1.2;
const B: f64 = 0.75;
const MIN_IDF: f64 = 1e-6;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: DocId,
    pub filename: String,
    #[serde(rename = "content")]
    pub snippet: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub total_results: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Clamped to `1..=MAX_RESULTS`.
    pub limit: usize,
    /// Checked between storage reads; passing it aborts the query.
    pub deadline: Option<Instant>,
}

impl Default for SearchOptions {
    fn default() -> Self { Self { limit: MAX_RESULTS, deadline: None } }
}

/// Stateless per-request view over a store.
pub struct QueryEngine<'a> {
    store: &'a DocumentStore,
    snippets: SnippetExtractor,
    options: SearchOptions,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store, snippets: SnippetExtractor::default(), options: SearchOptions::default() }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_snippets(mut self, snippets: SnippetExtractor) -> Self {
        self.snippets = snippets;
        self
    }

    pub fn search(&self, raw: &str) -> Result<SearchResults> {
        let query = Query::parse(raw, self.store.policy())?;
        let ranked = self.rank(&query).map_err(Error::into_search)?;

        let mut results = Vec::with_capacity(ranked.len());
        for (doc_id, score) in ranked {
            self.check_deadline()?;
            let Some(meta) = self.store.doc_meta(doc_id) else { continue };
            let content = self.store.content(meta).map_err(Error::into_search)?;
            results.push(SearchResult {
                id: doc_id,
                filename: meta.filename.clone(),
                snippet: self.snippets.extract(&content, &query),
                score,
            });
        }
        tracing::debug!(query = raw, hits = results.len(), "search complete");
        Ok(SearchResults { query: raw.to_string(), total_results: results.len(), results })
    }

    /// Matching documents with their scores, best first (ties by ascending id),
    /// cut to the configured limit.
    pub fn rank(&self, query: &Query) -> Result<Vec<(DocId, f64)>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let n = self.store.num_docs() as f64;
        let avgdl = self.store.avg_doc_len();
        let avgdl = if avgdl > 0.0 { avgdl } else { 1.0 };

        let mut scores: Option<HashMap<DocId, f64>> = None;
        for phrase in query.phrases() {
            self.check_deadline()?;
            let freqs = self.phrase_frequencies(phrase)?;
            if freqs.is_empty() {
                return Ok(Vec::new());
            }
            let idf = idf(n, freqs.len() as f64);
            let mut next = HashMap::with_capacity(freqs.len());
            for (doc_id, f) in freqs {
                let prev = match &scores {
                    Some(s) => match s.get(&doc_id) {
                        Some(v) => *v,
                        None => continue,
                    },
                    None => 0.0,
                };
                let dl = self.store.doc_meta(doc_id).map_or(0.0, |m| m.length as f64);
                next.insert(doc_id, prev + idf * tf_weight(f as f64, dl, avgdl));
            }
            if next.is_empty() {
                return Ok(Vec::new());
            }
            scores = Some(next);
        }

        let mut scored: Vec<(DocId, f64)> = scores.unwrap_or_default().into_iter().collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(self.options.limit.clamp(1, MAX_RESULTS));
        Ok(scored)
    }

    /// Occurrence count of a phrase in every document containing it.
    fn phrase_frequencies(&self, phrase: &Phrase) -> Result<HashMap<DocId, u32>> {
        let mut lists = Vec::with_capacity(phrase.terms.len());
        for term in &phrase.terms {
            self.check_deadline()?;
            let postings = self.store.postings(term)?;
            if postings.is_empty() {
                return Ok(HashMap::new());
            }
            lists.push(postings);
        }
        let Some((head, tail)) = lists.split_first() else { return Ok(HashMap::new()) };

        if tail.is_empty() {
            return Ok(head.iter().map(|p| (p.doc_id, p.tf())).collect());
        }
        let tail_maps: Vec<HashMap<DocId, &[u32]>> = tail
            .iter()
            .map(|plist| plist.iter().map(|p| (p.doc_id, p.positions.as_slice())).collect())
            .collect();

        let mut freqs = HashMap::new();
        'docs: for posting in head {
            let mut positions: Vec<&[u32]> = Vec::with_capacity(lists.len());
            positions.push(&posting.positions);
            for map in &tail_maps {
                match map.get(&posting.doc_id) {
                    Some(p) => positions.push(*p),
                    None => continue 'docs,
                }
            }
            let count = Phrase::starts(&positions).len() as u32;
            if count > 0 {
                freqs.insert(posting.doc_id, count);
            }
        }
        Ok(freqs)
    }

    fn check_deadline(&self) -> Result<()> {
        match self.options.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::SearchError("deadline exceeded".into())),
            _ => Ok(()),
        }
    }
}

fn idf(n: f64, df: f64) -> f64 {
    ((n - df + 0.5) / (df + 0.5)).ln().max(MIN_IDF)
}

fn tf_weight(f: f64, dl: f64, avgdl: f64) -> f64 {
    f * (K1 + 1.0) / (f + K1 * (1.0 - B + B * dl / avgdl))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idf_is_floored_for_common_terms() {
        assert_eq!(idf(2.0, 2.0), MIN_IDF);
        assert!(idf(100.0, 1.0) > idf(100.0, 10.0));
    }

    #[test]
    fn tf_weight_grows_with_frequency_and_saturates() {
        let one = tf_weight(1.0, 10.0, 10.0);
        let two = tf_weight(2.0, 10.0, 10.0);
        assert!(two > one);
        assert!(tf_weight(1000.0, 10.0, 10.0) < K1 + 1.0);
    }

    #[test]
    fn longer_documents_score_lower() {
        assert!(tf_weight(1.0, 5.0, 10.0) > tf_weight(1.0, 20.0, 10.0));
    }
}
