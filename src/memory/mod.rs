//! Memory retrieval subsystem.
//!
//! This module ranks stored text memories against a free-text query, organized into:
//! - `core`: Configuration, errors, entries, and entry types
//! - `retrieval`: Tokenizer, BM25 and cosine scorers, hybrid fusion, result assembly
//! - `storage`: Corpus sources (`SQLite`, in-memory), snapshots, embedding blobs
//! - `embedding`: Query embedders (`OpenAI`-compatible, Ollama via Rig)
//! - `engine`: The async searcher tying the pieces together
//! - `adapters`: Process-level helpers such as tracing setup

pub mod adapters;
pub mod core;
pub mod embedding;
pub mod engine;
pub mod retrieval;
pub mod storage;

// Re-export commonly used types for convenience
pub use adapters::init_tracing;
pub use core::{
    Bm25Config, EmbeddingConfig, EmbeddingProvider, EntryId, EntryType, MemoryConfig, MemoryEntry,
    MemoryError, MemoryResult, SearchConfig, StorageConfig,
};
pub use embedding::{EmbedFuture, OllamaEmbedder, OpenAiEmbedder, QueryEmbedder, build_embedder};
pub use engine::{MemorySearcher, SearchBackends};
pub use retrieval::{
    HybridRanker, LexicalScorer, RankingWeights, ResultAssembler, ScoredCandidate, SearchMode,
    SearchRequest, SearchResponse, SearchResult, SimilarResponse, VectorScorer, cosine_similarity,
    tokenize,
};
pub use storage::{
    CorpusSnapshot, CorpusSource, CorpusStats, InMemoryCorpus, SqliteCorpusStore, take_snapshot,
};
