//! Cosine similarity scoring over stored entry embeddings.

use crate::memory::core::entry::EntryId;
use crate::memory::core::errors::{MemoryError, MemoryResult};
use crate::memory::retrieval::lexical::rank_order;

/// Cosine similarity of two vectors, accumulated in `f64`.
///
/// Returns `0.0` when either vector has zero magnitude.
///
/// # Errors
/// Returns [`MemoryError::DimensionMismatch`] when the lengths differ.
pub fn cosine_similarity(query: &[f32], stored: &[f32]) -> MemoryResult<f64> {
    if query.len() != stored.len() {
        return Err(MemoryError::DimensionMismatch {
            expected: query.len(),
            found: stored.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut norm_q = 0.0_f64;
    let mut norm_s = 0.0_f64;
    for (q, s) in query.iter().zip(stored) {
        let q = f64::from(*q);
        let s = f64::from(*s);
        dot += q * s;
        norm_q += q * q;
        norm_s += s * s;
    }

    let denom = norm_q.sqrt() * norm_s.sqrt();
    if denom <= 0.0 {
        return Ok(0.0);
    }
    Ok(dot / denom)
}

/// One semantic candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SemanticHit {
    /// Entry identifier.
    pub id: EntryId,
    /// Cosine similarity with the query vector.
    pub similarity: f64,
}

/// Result of a semantic pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SemanticOutcome {
    /// Hits at or above the threshold, best first.
    pub hits: Vec<SemanticHit>,
    /// Number of stored vectors compared.
    pub searched: usize,
    /// Vectors at or above the threshold, counted before the limit is applied.
    pub matched: usize,
}

/// Threshold-filtered cosine ranking.
#[derive(Clone, Copy, Debug, Default)]
pub struct VectorScorer;

impl VectorScorer {
    /// Similarity of every stored vector, in input order.
    ///
    /// # Errors
    /// Fails on the first vector whose dimensionality differs from the query.
    pub fn score<'a, I>(self, query: &[f32], vectors: I) -> MemoryResult<Vec<SemanticHit>>
    where
        I: IntoIterator<Item = (EntryId, &'a [f32])>,
    {
        vectors
            .into_iter()
            .map(|(id, stored)| {
                cosine_similarity(query, stored).map(|similarity| SemanticHit { id, similarity })
            })
            .collect()
    }

    /// Keep hits with similarity `>= threshold`, best first, at most `limit`.
    ///
    /// # Errors
    /// Fails on the first vector whose dimensionality differs from the query.
    pub fn search<'a, I>(
        self,
        query: &[f32],
        vectors: I,
        threshold: f64,
        limit: usize,
    ) -> MemoryResult<SemanticOutcome>
    where
        I: IntoIterator<Item = (EntryId, &'a [f32])>,
    {
        let scored = self.score(query, vectors)?;
        let searched = scored.len();

        let mut hits: Vec<SemanticHit> = scored
            .into_iter()
            .filter(|hit| hit.similarity >= threshold)
            .collect();
        let matched = hits.len();
        hits.sort_by(|a, b| rank_order(a.similarity, a.id, b.similarity, b.id));
        hits.truncate(limit);

        Ok(SemanticOutcome {
            hits,
            searched,
            matched,
        })
    }
}
