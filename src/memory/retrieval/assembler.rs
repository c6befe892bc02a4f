//! Joins ranked candidates with entry metadata from the scoring snapshot.

use serde::Serialize;

use crate::memory::core::entry::EntryId;
use crate::memory::core::entry_type::EntryType;
use crate::memory::retrieval::hybrid_search::{RankedCandidates, ScoredCandidate, SearchMode};
use crate::memory::retrieval::weights::RankingWeights;
use crate::memory::storage::corpus_store::CorpusSnapshot;

/// One search result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    /// Entry identifier.
    pub id: EntryId,
    /// Entry text.
    pub content: String,
    /// Entry type.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Entry importance.
    pub importance: u8,
    /// Final ranking score.
    pub combined_score: f64,
    /// Normalized lexical score, when the lexical pass returned this entry.
    pub lexical_score: Option<f64>,
    /// Cosine similarity, when the semantic pass returned this entry.
    pub semantic_score: Option<f64>,
}

/// Full answer to a search.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResponse {
    /// Query as given.
    pub query: String,
    /// Mode that produced the results.
    pub mode: SearchMode,
    /// Normalized weights used for fusion.
    pub weights: RankingWeights,
    /// Results, best first.
    pub results: Vec<SearchResult>,
    /// Candidates considered: the fused union in hybrid mode, entries scored otherwise.
    pub total_candidates: usize,
    /// Candidates that survived the score filter, before truncation.
    pub above_threshold: usize,
    /// Informational message for empty outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Set when a hybrid search fell back to keyword-only scoring.
    pub degraded: bool,
}

impl SearchResponse {
    /// A response without results.
    #[must_use]
    pub fn empty(
        query: impl Into<String>,
        mode: SearchMode,
        weights: RankingWeights,
        message: Option<String>,
    ) -> Self {
        Self {
            query: query.into(),
            mode,
            weights,
            results: Vec::new(),
            total_candidates: 0,
            above_threshold: 0,
            message,
            degraded: false,
        }
    }
}

/// Answer to a similar-entry lookup.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimilarResponse {
    /// Entry used as the query.
    pub source_id: EntryId,
    /// Text of the source entry.
    pub source_content: String,
    /// Most similar other entries.
    pub results: Vec<SearchResult>,
    /// Embedded entries compared against the source.
    pub total_compared: usize,
}

/// Maps candidates back to entries.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResultAssembler;

impl ResultAssembler {
    /// Build results in candidate order. Candidates absent from the snapshot are dropped.
    #[must_use]
    pub fn results(self, candidates: &[ScoredCandidate], snapshot: &CorpusSnapshot) -> Vec<SearchResult> {
        candidates
            .iter()
            .filter_map(|candidate| {
                let entry = snapshot.entry(candidate.id)?;
                Some(SearchResult {
                    id: entry.id,
                    content: entry.content.clone(),
                    entry_type: entry.entry_type,
                    importance: entry.importance,
                    combined_score: candidate.combined_score,
                    lexical_score: candidate.lexical_score,
                    semantic_score: candidate.semantic_score,
                })
            })
            .collect()
    }

    /// Build the full response for a ranking.
    #[must_use]
    pub fn assemble(
        self,
        query: &str,
        weights: RankingWeights,
        ranked: &RankedCandidates,
        snapshot: &CorpusSnapshot,
    ) -> SearchResponse {
        SearchResponse {
            query: query.to_string(),
            mode: ranked.mode,
            weights,
            results: self.results(&ranked.candidates, snapshot),
            total_candidates: ranked.total_candidates,
            above_threshold: ranked.above_threshold,
            message: None,
            degraded: false,
        }
    }
}
