//! Core memory types, configuration, and errors.

pub mod config;
pub mod entry;
pub mod entry_type;
pub mod errors;

pub use config::{
    Bm25Config, EmbeddingConfig, EmbeddingProvider, MemoryConfig, SearchConfig, StorageConfig,
};
pub use entry::{EntryId, MAX_IMPORTANCE, MIN_IMPORTANCE, MemoryEntry};
pub use entry_type::{EntryType, EntryTypeParseError};
pub use errors::{MemoryError, MemoryResult};
