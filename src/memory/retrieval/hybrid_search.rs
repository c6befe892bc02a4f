//! Hybrid search combining BM25 keyword matching with vector similarity.
//!
//! Both passes over-fetch candidates, then the union is fused with a weighted
//! sum of the normalized lexical score and the cosine similarity. A candidate
//! missing from one pass contributes 0 for that signal.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::memory::core::config::MemoryConfig;
use crate::memory::core::entry::EntryId;
use crate::memory::core::entry_type::EntryType;
use crate::memory::core::errors::{MemoryError, MemoryResult};
use crate::memory::retrieval::lexical::{LexicalOutcome, LexicalScorer, TokenizedDocument, rank_order};
use crate::memory::retrieval::semantic::{SemanticOutcome, VectorScorer};
use crate::memory::retrieval::weights::RankingWeights;
use crate::memory::storage::corpus_store::CorpusSnapshot;

/// Which signals a search uses.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Weighted fusion of BM25 and cosine similarity.
    #[default]
    Hybrid,
    /// BM25 only; no embedding is requested.
    KeywordOnly,
    /// Cosine similarity only.
    SemanticOnly,
}

impl SearchMode {
    /// Stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::KeywordOnly => "keyword_only",
            Self::SemanticOnly => "semantic_only",
        }
    }

    /// Whether this mode needs a query embedding.
    #[must_use]
    pub const fn needs_embedding(self) -> bool {
        !matches!(self, Self::KeywordOnly)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "keyword_only" | "keyword" => Ok(Self::KeywordOnly),
            "semantic_only" | "semantic" => Ok(Self::SemanticOnly),
            other => Err(MemoryError::InvalidConfig(format!(
                "unknown search mode: {other}"
            ))),
        }
    }
}

/// Parameters of one search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    /// Free-text query.
    pub query: String,
    /// Signals to use.
    pub mode: SearchMode,
    /// Restrict both passes to one entry type.
    pub entry_type: Option<EntryType>,
    /// Maximum number of results. Zero yields an empty result set.
    pub limit: usize,
    /// Fusion weights, normalized before use.
    pub weights: RankingWeights,
    /// Minimum fused score kept in hybrid mode (inclusive).
    pub min_score: f64,
    /// Overrides the mode's default cosine threshold.
    pub semantic_threshold: Option<f64>,
    /// Degrade a hybrid search to keyword-only when the embedder fails.
    pub allow_keyword_fallback: bool,
}

impl SearchRequest {
    /// Create a hybrid request with the stock defaults.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self::from_config(query, &MemoryConfig::default())
    }

    /// Create a request with defaults taken from configuration.
    #[must_use]
    pub fn from_config(query: impl Into<String>, config: &MemoryConfig) -> Self {
        Self {
            query: query.into(),
            mode: SearchMode::Hybrid,
            entry_type: None,
            limit: config.search.default_limit,
            weights: config.search.weights(),
            min_score: config.search.min_score,
            semantic_threshold: None,
            allow_keyword_fallback: config.search.allow_keyword_fallback,
        }
    }

    /// Set the search mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Restrict to one entry type.
    #[must_use]
    pub const fn with_entry_type(mut self, entry_type: Option<EntryType>) -> Self {
        self.entry_type = entry_type;
        self
    }

    /// Set the result limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the fusion weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: RankingWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the minimum fused score.
    #[must_use]
    pub const fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    /// Override the cosine threshold.
    #[must_use]
    pub const fn with_semantic_threshold(mut self, threshold: Option<f64>) -> Self {
        self.semantic_threshold = threshold;
        self
    }

    /// Allow or forbid the keyword-only fallback.
    #[must_use]
    pub const fn with_keyword_fallback(mut self, allow: bool) -> Self {
        self.allow_keyword_fallback = allow;
        self
    }

    /// Validate the request.
    ///
    /// # Errors
    /// Returns [`MemoryError::InvalidWeights`] for bad weights and
    /// [`MemoryError::InvalidConfig`] for out-of-range scores.
    pub fn validate(&self) -> MemoryResult<()> {
        self.weights.validate()?;

        if !self.min_score.is_finite() {
            return Err(MemoryError::InvalidConfig(
                "min_score must be finite".to_string(),
            ));
        }

        if let Some(threshold) = self
            .semantic_threshold
            .filter(|threshold| !(-1.0..=1.0).contains(threshold))
        {
            return Err(MemoryError::InvalidConfig(format!(
                "semantic threshold must be in [-1, 1], got {threshold}"
            )));
        }

        Ok(())
    }
}

/// A candidate with its per-signal scores.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoredCandidate {
    /// Entry identifier.
    pub id: EntryId,
    /// Normalized lexical score, if the lexical pass returned this entry.
    pub lexical_score: Option<f64>,
    /// Cosine similarity, if the semantic pass returned this entry.
    pub semantic_score: Option<f64>,
    /// Final ranking score.
    pub combined_score: f64,
}

/// Ranked candidates with diagnostic counters.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedCandidates {
    /// Mode that produced the ranking.
    pub mode: SearchMode,
    /// Best first, at most `limit`.
    pub candidates: Vec<ScoredCandidate>,
    /// Hybrid: distinct ids returned by both passes. Single signal: entries scored.
    pub total_candidates: usize,
    /// Candidates that survived the score filter, before truncation.
    pub above_threshold: usize,
}

/// Runs the scoring passes and fuses their output.
#[derive(Clone, Copy, Debug)]
pub struct HybridRanker {
    lexical: LexicalScorer,
    vector: VectorScorer,
    over_fetch_factor: usize,
    hybrid_semantic_threshold: f64,
    semantic_only_threshold: f64,
}

impl Default for HybridRanker {
    fn default() -> Self {
        Self::from_config(&MemoryConfig::default())
    }
}

impl HybridRanker {
    /// Build a ranker from configuration.
    #[must_use]
    pub const fn from_config(config: &MemoryConfig) -> Self {
        Self {
            lexical: LexicalScorer::from_config(config.bm25),
            vector: VectorScorer,
            over_fetch_factor: config.search.over_fetch_factor,
            hybrid_semantic_threshold: config.search.hybrid_semantic_threshold,
            semantic_only_threshold: config.search.semantic_only_threshold,
        }
    }

    /// Number of candidates each pass fetches for `mode`.
    #[must_use]
    pub const fn candidate_pool(&self, mode: SearchMode, limit: usize) -> usize {
        match mode {
            SearchMode::Hybrid => limit.saturating_mul(self.over_fetch_factor),
            SearchMode::KeywordOnly | SearchMode::SemanticOnly => limit,
        }
    }

    /// Cosine threshold for `mode`, unless the caller overrides it.
    #[must_use]
    pub fn semantic_threshold(&self, mode: SearchMode, requested: Option<f64>) -> f64 {
        requested.unwrap_or(match mode {
            SearchMode::SemanticOnly => self.semantic_only_threshold,
            SearchMode::Hybrid | SearchMode::KeywordOnly => self.hybrid_semantic_threshold,
        })
    }

    /// BM25 pass over the snapshot's documents.
    #[must_use]
    pub fn lexical_pass(
        &self,
        query_tokens: &[String],
        documents: &[TokenizedDocument],
        pool: usize,
    ) -> LexicalOutcome {
        self.lexical.search(query_tokens, documents, pool)
    }

    /// Cosine pass over the snapshot's vectors.
    ///
    /// # Errors
    /// Returns [`MemoryError::DimensionMismatch`] when a stored vector disagrees
    /// with the query vector.
    pub fn semantic_pass(
        &self,
        query_vector: &[f32],
        snapshot: &CorpusSnapshot,
        threshold: f64,
        pool: usize,
    ) -> MemoryResult<SemanticOutcome> {
        self.vector
            .search(query_vector, snapshot.vectors(), threshold, pool)
    }

    /// Turn a lexical pass into final candidates.
    #[must_use]
    pub fn keyword_only(outcome: &LexicalOutcome, limit: usize) -> RankedCandidates {
        let candidates: Vec<ScoredCandidate> = outcome
            .hits
            .iter()
            .take(limit)
            .map(|hit| ScoredCandidate {
                id: hit.id,
                lexical_score: Some(hit.score),
                semantic_score: None,
                combined_score: hit.score,
            })
            .collect();
        RankedCandidates {
            mode: SearchMode::KeywordOnly,
            total_candidates: outcome.scored,
            above_threshold: outcome.matched,
            candidates,
        }
    }

    /// Turn a semantic pass into final candidates.
    #[must_use]
    pub fn semantic_only(outcome: &SemanticOutcome, limit: usize) -> RankedCandidates {
        let candidates: Vec<ScoredCandidate> = outcome
            .hits
            .iter()
            .take(limit)
            .map(|hit| ScoredCandidate {
                id: hit.id,
                lexical_score: None,
                semantic_score: Some(hit.similarity),
                combined_score: hit.similarity,
            })
            .collect();
        RankedCandidates {
            mode: SearchMode::SemanticOnly,
            total_candidates: outcome.searched,
            above_threshold: outcome.matched,
            candidates,
        }
    }

    /// Fuse both passes.
    ///
    /// # Errors
    /// Returns [`MemoryError::InvalidWeights`] when the weights cannot be normalized.
    pub fn fuse(
        lexical: &LexicalOutcome,
        semantic: &SemanticOutcome,
        weights: RankingWeights,
        min_score: f64,
        limit: usize,
    ) -> MemoryResult<RankedCandidates> {
        let weights = weights.normalized()?;

        let mut union: BTreeMap<EntryId, (Option<f64>, Option<f64>)> = BTreeMap::new();
        for hit in &lexical.hits {
            union.entry(hit.id).or_default().0 = Some(hit.score);
        }
        for hit in &semantic.hits {
            union.entry(hit.id).or_default().1 = Some(hit.similarity);
        }
        let total_candidates = union.len();

        let mut candidates: Vec<ScoredCandidate> = union
            .into_iter()
            .map(|(id, (lexical_score, semantic_score))| ScoredCandidate {
                id,
                lexical_score,
                semantic_score,
                combined_score: weights.lexical.mul_add(
                    lexical_score.unwrap_or(0.0),
                    weights.semantic * semantic_score.unwrap_or(0.0),
                ),
            })
            .filter(|candidate| candidate.combined_score >= min_score)
            .collect();
        let above_threshold = candidates.len();

        candidates.sort_by(|a, b| rank_order(a.combined_score, a.id, b.combined_score, b.id));
        candidates.truncate(limit);

        Ok(RankedCandidates {
            mode: SearchMode::Hybrid,
            candidates,
            total_candidates,
            above_threshold,
        })
    }
}
