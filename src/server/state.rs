//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::memory::core::config::MemoryConfig;
use crate::memory::core::errors::MemoryResult;
use crate::memory::engine::MemorySearcher;

/// Shared application state.
pub struct AppState {
    /// Searcher answering every request.
    pub searcher: MemorySearcher,
}

impl AppState {
    /// Wrap an existing searcher.
    #[must_use]
    pub fn new(searcher: MemorySearcher) -> Arc<Self> {
        Arc::new(Self { searcher })
    }

    /// Build the `SQLite`-backed searcher from configuration.
    ///
    /// # Errors
    /// Returns an error if the backends cannot be initialized.
    pub async fn from_config(config: MemoryConfig) -> MemoryResult<Arc<Self>> {
        let searcher = MemorySearcher::from_config(config).await?;
        Ok(Self::new(searcher))
    }
}
