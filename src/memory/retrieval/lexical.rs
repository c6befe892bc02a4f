//! BM25 keyword scoring over a tokenized corpus.
//!
//! Raw BM25 scores are normalized by the best score of the query so the
//! lexical signal lives in `[0, 1]` like cosine similarity does. When no
//! document earns a positive raw score the scorer falls back to plain token
//! overlap, which keeps obvious matches visible on tiny corpora.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::memory::core::config::Bm25Config;
use crate::memory::core::entry::EntryId;

/// A document prepared for lexical scoring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizedDocument {
    /// Entry identifier.
    pub id: EntryId,
    /// Tokens in document order, duplicates kept.
    pub tokens: Vec<String>,
}

impl TokenizedDocument {
    /// Tokenize `content` for entry `id`.
    #[must_use]
    pub fn from_content(id: EntryId, content: &str) -> Self {
        Self {
            id,
            tokens: super::tokenizer::tokenize(content),
        }
    }
}

/// Which branch produced the lexical scores.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LexicalStrategy {
    /// Normalized BM25.
    Bm25,
    /// Token overlap ratio, used when every raw BM25 score is zero.
    Overlap,
}

/// One lexical candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LexicalHit {
    /// Entry identifier.
    pub id: EntryId,
    /// Normalized score in `(0, 1]`.
    pub score: f64,
    /// Raw BM25 score, or the overlap count in the fallback branch.
    pub raw_score: f64,
}

/// Result of a lexical pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LexicalOutcome {
    /// Hits sorted by score descending, ties by id ascending.
    pub hits: Vec<LexicalHit>,
    /// Branch that produced the scores.
    pub strategy: LexicalStrategy,
    /// Documents scored.
    pub scored: usize,
    /// Documents with a positive score, counted before the limit is applied.
    pub matched: usize,
}

impl LexicalOutcome {
    const fn empty(scored: usize) -> Self {
        Self {
            hits: Vec::new(),
            strategy: LexicalStrategy::Bm25,
            scored,
            matched: 0,
        }
    }
}

/// Okapi BM25 scorer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LexicalScorer {
    k1: f64,
    b: f64,
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::from_config(Bm25Config::default())
    }
}

impl LexicalScorer {
    /// Create a scorer with explicit parameters.
    #[must_use]
    pub const fn new(k1: f64, b: f64) -> Self {
        Self { k1, b }
    }

    /// Create a scorer from configuration.
    #[must_use]
    pub const fn from_config(config: Bm25Config) -> Self {
        Self::new(config.k1, config.b)
    }

    /// Raw BM25 score of every document, in corpus order.
    ///
    /// Query tokens are summed with their duplicates.
    #[must_use]
    pub fn score(&self, query_tokens: &[String], corpus: &[TokenizedDocument]) -> Vec<f64> {
        if corpus.is_empty() {
            return Vec::new();
        }

        let doc_count = count_as_f64(corpus.len());
        let total_len: usize = corpus.iter().map(|doc| doc.tokens.len()).sum();
        let mean_len = count_as_f64(total_len) / doc_count;
        let avg_doc_len = if mean_len > 0.0 { mean_len } else { 1.0 };

        let mut doc_freqs: HashMap<&str, usize> = HashMap::new();
        for doc in corpus {
            let unique: HashSet<&str> = doc.tokens.iter().map(String::as_str).collect();
            for token in unique {
                *doc_freqs.entry(token).or_insert(0) += 1;
            }
        }

        corpus
            .iter()
            .map(|doc| {
                let mut term_freqs: HashMap<&str, usize> = HashMap::new();
                for token in &doc.tokens {
                    *term_freqs.entry(token.as_str()).or_insert(0) += 1;
                }
                let doc_len = count_as_f64(doc.tokens.len());

                query_tokens
                    .iter()
                    .filter_map(|term| {
                        let tf = count_as_f64(*term_freqs.get(term.as_str())?);
                        let df = count_as_f64(doc_freqs.get(term.as_str()).copied().unwrap_or(1));
                        let idf = ((doc_count - df + 0.5) / (df + 0.5)).ln_1p();
                        let length_norm = self.b.mul_add(doc_len / avg_doc_len, 1.0 - self.b);
                        let numerator = tf * (self.k1 + 1.0);
                        let denominator = self.k1.mul_add(length_norm, tf);
                        Some(idf * (numerator / denominator))
                    })
                    .sum()
            })
            .collect()
    }

    /// Score, normalize and rank the corpus, keeping at most `limit` hits.
    #[must_use]
    pub fn search(
        &self,
        query_tokens: &[String],
        corpus: &[TokenizedDocument],
        limit: usize,
    ) -> LexicalOutcome {
        if query_tokens.is_empty() || corpus.is_empty() || limit == 0 {
            return LexicalOutcome::empty(corpus.len());
        }

        let raw_scores = self.score(query_tokens, corpus);
        finalize(query_tokens, corpus, &raw_scores, limit)
    }
}

fn finalize(
    query_tokens: &[String],
    corpus: &[TokenizedDocument],
    raw_scores: &[f64],
    limit: usize,
) -> LexicalOutcome {
    if raw_scores.is_empty() {
        return LexicalOutcome::empty(corpus.len());
    }
    let max_raw = raw_scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let (mut hits, strategy) = if max_raw > 0.0 {
        let hits: Vec<LexicalHit> = corpus
            .iter()
            .zip(raw_scores)
            .filter(|(_, raw)| **raw > 0.0)
            .map(|(doc, raw)| LexicalHit {
                id: doc.id,
                score: raw / max_raw,
                raw_score: *raw,
            })
            .collect();
        (hits, LexicalStrategy::Bm25)
    } else {
        let query_set: HashSet<&str> = query_tokens.iter().map(String::as_str).collect();
        let denominator = count_as_f64(query_tokens.len().max(1));
        let hits: Vec<LexicalHit> = corpus
            .iter()
            .filter_map(|doc| {
                let doc_set: HashSet<&str> = doc.tokens.iter().map(String::as_str).collect();
                let overlap = doc_set.intersection(&query_set).count();
                (overlap > 0).then(|| LexicalHit {
                    id: doc.id,
                    score: count_as_f64(overlap) / denominator,
                    raw_score: count_as_f64(overlap),
                })
            })
            .collect();
        (hits, LexicalStrategy::Overlap)
    };

    let matched = hits.len();
    hits.sort_by(|a, b| rank_order(a.score, a.id, b.score, b.id));
    hits.truncate(limit);
    LexicalOutcome {
        hits,
        strategy,
        scored: corpus.len(),
        matched,
    }
}

/// Descending by score, then ascending by id.
pub(crate) fn rank_order(a_score: f64, a_id: EntryId, b_score: f64, b_id: EntryId) -> Ordering {
    b_score.total_cmp(&a_score).then_with(|| a_id.cmp(&b_id))
}

pub(crate) fn count_as_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}
