//! Read-only corpus access and the per-query snapshot.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::memory::core::entry::{EntryId, MemoryEntry};
use crate::memory::core::entry_type::EntryType;
use crate::memory::core::errors::MemoryResult;
use crate::memory::retrieval::lexical::{TokenizedDocument, count_as_f64};

/// Boxed future type for corpus source operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Entries with the embeddings of those entries, read together.
pub type CorpusRows = (Vec<MemoryEntry>, BTreeMap<EntryId, Vec<f32>>);

/// Source of active entries and their embeddings.
pub trait CorpusSource: Send + Sync {
    /// Active, unexpired entries, optionally restricted to one type.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn fetch_active_corpus(
        &self,
        entry_type: Option<EntryType>,
    ) -> StoreFuture<'_, MemoryResult<Vec<MemoryEntry>>>;

    /// Embeddings of active entries, optionally restricted to one type.
    ///
    /// # Errors
    /// Returns an error if storage access fails or a blob cannot be decoded.
    fn fetch_vectors(
        &self,
        entry_type: Option<EntryType>,
    ) -> StoreFuture<'_, MemoryResult<BTreeMap<EntryId, Vec<f32>>>>;

    /// Entries and embeddings as of one point in time.
    ///
    /// The default runs both fetches concurrently; sources that can read both
    /// in a single consistent operation should override it.
    ///
    /// # Errors
    /// Returns the first storage error.
    fn fetch_corpus(&self, entry_type: Option<EntryType>) -> StoreFuture<'_, MemoryResult<CorpusRows>> {
        Box::pin(async move {
            tokio::try_join!(
                self.fetch_active_corpus(entry_type),
                self.fetch_vectors(entry_type)
            )
        })
    }
}

/// Immutable view of the corpus taken at query start.
#[derive(Clone, Debug, Default)]
pub struct CorpusSnapshot {
    entries: Vec<MemoryEntry>,
    index: HashMap<EntryId, usize>,
    documents: Vec<TokenizedDocument>,
    vectors: BTreeMap<EntryId, Vec<f32>>,
}

impl CorpusSnapshot {
    /// Build a snapshot. Inactive entries and vectors of unknown entries are dropped.
    #[must_use]
    pub fn new(entries: Vec<MemoryEntry>, mut vectors: BTreeMap<EntryId, Vec<f32>>) -> Self {
        let entries: Vec<MemoryEntry> = entries.into_iter().filter(|entry| entry.active).collect();
        let index: HashMap<EntryId, usize> = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.id, position))
            .collect();
        let documents = entries
            .iter()
            .map(|entry| TokenizedDocument::from_content(entry.id, &entry.content))
            .collect();
        vectors.retain(|id, _| index.contains_key(id));

        Self {
            entries,
            index,
            documents,
            vectors,
        }
    }

    /// Entries in store order.
    #[must_use]
    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    /// Tokenized entries in store order.
    #[must_use]
    pub fn documents(&self) -> &[TokenizedDocument] {
        &self.documents
    }

    /// Embedded entries in id order.
    pub fn vectors(&self) -> impl Iterator<Item = (EntryId, &[f32])> {
        self.vectors.iter().map(|(id, vector)| (*id, vector.as_slice()))
    }

    /// Look up an entry.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&MemoryEntry> {
        self.index.get(&id).and_then(|position| self.entries.get(*position))
    }

    /// Look up an entry's embedding.
    #[must_use]
    pub fn vector(&self, id: EntryId) -> Option<&[f32]> {
        self.vectors.get(&id).map(Vec::as_slice)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of embedded entries.
    #[must_use]
    pub fn embedded_len(&self) -> usize {
        self.vectors.len()
    }

    /// Embedding coverage.
    #[must_use]
    pub fn stats(&self) -> CorpusStats {
        CorpusStats::new(self.len(), self.embedded_len())
    }
}

/// Embedding coverage of the active corpus.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CorpusStats {
    /// Active entries.
    pub total_active_entries: usize,
    /// Active entries with an embedding.
    pub with_embeddings: usize,
    /// Active entries without an embedding.
    pub without_embeddings: usize,
    /// Share of embedded entries, in percent with one decimal.
    pub coverage_percent: f64,
}

impl CorpusStats {
    fn new(total: usize, embedded: usize) -> Self {
        let coverage_percent = if total == 0 {
            0.0
        } else {
            (count_as_f64(embedded) / count_as_f64(total) * 1000.0).round() / 10.0
        };
        Self {
            total_active_entries: total,
            with_embeddings: embedded,
            without_embeddings: total.saturating_sub(embedded),
            coverage_percent,
        }
    }
}

/// Read the corpus once and build a snapshot.
///
/// # Errors
/// Returns the first storage error.
pub async fn take_snapshot(
    source: &dyn CorpusSource,
    entry_type: Option<EntryType>,
) -> MemoryResult<CorpusSnapshot> {
    let (entries, vectors) = source.fetch_corpus(entry_type).await?;
    Ok(CorpusSnapshot::new(entries, vectors))
}
