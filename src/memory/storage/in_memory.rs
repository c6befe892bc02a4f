//! In-process corpus source, used by tests and embedders of the library.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::memory::core::entry::{EntryId, MemoryEntry};
use crate::memory::core::entry_type::EntryType;
use crate::memory::core::errors::MemoryResult;
use crate::memory::storage::corpus_store::{CorpusRows, CorpusSource, StoreFuture};

#[derive(Default)]
struct Inner {
    entries: Vec<MemoryEntry>,
    vectors: BTreeMap<EntryId, Vec<f32>>,
}

/// Corpus held in memory.
#[derive(Default)]
pub struct InMemoryCorpus {
    inner: RwLock<Inner>,
}

impl InMemoryCorpus {
    /// Create a corpus from entries without embeddings.
    #[must_use]
    pub fn new(entries: Vec<MemoryEntry>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries,
                vectors: BTreeMap::new(),
            }),
        }
    }

    /// Attach an embedding to an entry.
    #[must_use]
    pub fn with_vector(self, id: impl Into<EntryId>, vector: Vec<f32>) -> Self {
        let mut inner = self.inner.into_inner();
        inner.vectors.insert(id.into(), vector);
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Add or replace an entry.
    pub async fn upsert(&self, entry: MemoryEntry) {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.entries.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry;
        } else {
            inner.entries.push(entry);
        }
    }

    /// Add or replace an embedding.
    pub async fn set_vector(&self, id: impl Into<EntryId>, vector: Vec<f32>) {
        self.inner.write().await.vectors.insert(id.into(), vector);
    }
}

fn matches_filter(entry: &MemoryEntry, entry_type: Option<EntryType>) -> bool {
    entry.active && entry_type.is_none_or(|wanted| entry.entry_type == wanted)
}

impl Inner {
    fn active_entries(&self, entry_type: Option<EntryType>) -> Vec<MemoryEntry> {
        self.entries
            .iter()
            .filter(|entry| matches_filter(entry, entry_type))
            .cloned()
            .collect()
    }

    fn active_vectors(&self, entry_type: Option<EntryType>) -> BTreeMap<EntryId, Vec<f32>> {
        self.entries
            .iter()
            .filter(|entry| matches_filter(entry, entry_type))
            .filter_map(|entry| {
                self.vectors
                    .get(&entry.id)
                    .map(|vector| (entry.id, vector.clone()))
            })
            .collect()
    }
}

impl CorpusSource for InMemoryCorpus {
    fn fetch_active_corpus(
        &self,
        entry_type: Option<EntryType>,
    ) -> StoreFuture<'_, MemoryResult<Vec<MemoryEntry>>> {
        Box::pin(async move { Ok(self.inner.read().await.active_entries(entry_type)) })
    }

    fn fetch_vectors(
        &self,
        entry_type: Option<EntryType>,
    ) -> StoreFuture<'_, MemoryResult<BTreeMap<EntryId, Vec<f32>>>> {
        Box::pin(async move { Ok(self.inner.read().await.active_vectors(entry_type)) })
    }

    fn fetch_corpus(&self, entry_type: Option<EntryType>) -> StoreFuture<'_, MemoryResult<CorpusRows>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok((inner.active_entries(entry_type), inner.active_vectors(entry_type)))
        })
    }
}
