//! Error types for the recall engine.

use thiserror::Error;

use crate::memory::core::entry::EntryId;

/// Recall engine error type.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A stored entry could not be decoded into a [`MemoryEntry`](crate::memory::MemoryEntry).
    #[error("invalid memory entry: {0}")]
    InvalidEntry(String),
    /// Negative, non-finite, or all-zero ranking weights.
    #[error("invalid ranking weights: {0}")]
    InvalidWeights(String),
    /// Query vector and stored vector disagree on dimensionality.
    #[error("vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Dimensionality of the query vector.
        expected: usize,
        /// Dimensionality of the offending stored vector.
        found: usize,
    },
    /// The external embedding generator failed or is unreachable.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),
    /// No active entry with this id exists in the snapshot.
    #[error("memory entry {0} not found")]
    EntryNotFound(EntryId),
    /// The entry exists but has never been embedded.
    #[error("memory entry {0} has no embedding")]
    MissingEmbedding(EntryId),
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A blocking scoring task panicked or was cancelled.
    #[error("scoring task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl MemoryError {
    /// Whether a hybrid search may recover from this error by dropping to keyword-only scoring.
    #[must_use]
    pub const fn allows_keyword_fallback(&self) -> bool {
        matches!(self, Self::EmbeddingUnavailable(_))
    }

    /// Whether the error was caused by caller input rather than by the engine or its backends.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::InvalidWeights(_))
    }
}

/// Convenience result alias for recall operations.
pub type MemoryResult<T> = Result<T, MemoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_embedding_failures_allow_fallback() {
        assert!(MemoryError::EmbeddingUnavailable("timeout".to_string()).allows_keyword_fallback());
        assert!(!MemoryError::InvalidWeights("negative".to_string()).allows_keyword_fallback());
        assert!(
            !MemoryError::DimensionMismatch {
                expected: 3,
                found: 2
            }
            .allows_keyword_fallback()
        );
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = MemoryError::DimensionMismatch {
            expected: 1536,
            found: 768,
        };
        assert_eq!(
            err.to_string(),
            "vector dimension mismatch: expected 1536, found 768"
        );
        assert!(!err.is_invalid_input());
    }
}
