//! Corpus sources and the per-query snapshot.

pub mod codec;
pub mod corpus_store;
pub mod in_memory;
pub mod sqlite_corpus;

pub use codec::{decode_embedding, encode_embedding};
pub use corpus_store::{
    CorpusRows, CorpusSnapshot, CorpusSource, CorpusStats, StoreFuture, take_snapshot,
};
pub use in_memory::InMemoryCorpus;
pub use sqlite_corpus::SqliteCorpusStore;
