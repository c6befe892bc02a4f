//! Configuration for the recall engine.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::memory::core::errors::{MemoryError, MemoryResult};
use crate::memory::retrieval::weights::RankingWeights;

/// Top-level configuration for the recall engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Search and fusion settings.
    pub search: SearchConfig,
    /// BM25 parameters.
    pub bm25: Bm25Config,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Query embedding settings.
    pub embedding: EmbeddingConfig,
}

impl MemoryConfig {
    /// Load a JSON config file. Missing sections fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> MemoryResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Overlay `RECALL_*` and `OPENAI_API_KEY` environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn apply_env(&mut self) -> MemoryResult<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> MemoryResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("RECALL_DB_PATH") {
            self.storage.sqlite_path = PathBuf::from(path);
        }
        if let Some(provider) = lookup("RECALL_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider.parse()?;
        }
        if let Some(model) = lookup("RECALL_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(ndims) = lookup("RECALL_EMBEDDING_NDIMS") {
            self.embedding.ndims = ndims.trim().parse().map_err(|_| {
                MemoryError::InvalidConfig(format!("RECALL_EMBEDDING_NDIMS is not a number: {ndims}"))
            })?;
        }
        if let Some(base_url) = lookup("RECALL_EMBEDDING_BASE_URL") {
            self.embedding.base_url = Some(base_url);
        }
        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            self.embedding.api_key = Some(api_key);
        }
        Ok(())
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> MemoryResult<()> {
        self.search.validate()?;
        self.bm25.validate()?;
        self.storage.validate()?;
        self.embedding.validate()?;
        Ok(())
    }
}

/// Search and fusion settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results returned when the caller does not ask for a limit.
    pub default_limit: usize,
    /// Default weight of the lexical signal.
    pub lexical_weight: f64,
    /// Default weight of the semantic signal.
    pub semantic_weight: f64,
    /// Minimum fused score kept in hybrid mode (inclusive).
    pub min_score: f64,
    /// Cosine threshold for the semantic pass of a hybrid search.
    pub hybrid_semantic_threshold: f64,
    /// Cosine threshold for semantic-only searches.
    pub semantic_only_threshold: f64,
    /// Each hybrid pass fetches `limit * over_fetch_factor` candidates.
    pub over_fetch_factor: usize,
    /// Result count for similar-entry lookups.
    pub similar_limit: usize,
    /// Cosine threshold for similar-entry lookups.
    pub similar_threshold: f64,
    /// Degrade hybrid searches to keyword-only when embeddings are unavailable.
    pub allow_keyword_fallback: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            lexical_weight: 0.7,
            semantic_weight: 0.3,
            min_score: 0.1,
            hybrid_semantic_threshold: 0.2,
            semantic_only_threshold: 0.3,
            over_fetch_factor: 3,
            similar_limit: 5,
            similar_threshold: 0.6,
            allow_keyword_fallback: true,
        }
    }
}

impl SearchConfig {
    /// Default weights as configured (not normalized).
    #[must_use]
    pub const fn weights(&self) -> RankingWeights {
        RankingWeights::new(self.lexical_weight, self.semantic_weight)
    }

    fn validate(&self) -> MemoryResult<()> {
        if self.default_limit == 0 {
            return Err(MemoryError::InvalidConfig(
                "search.default_limit must be > 0".to_string(),
            ));
        }

        if self.over_fetch_factor == 0 {
            return Err(MemoryError::InvalidConfig(
                "search.over_fetch_factor must be > 0".to_string(),
            ));
        }

        if self.similar_limit == 0 {
            return Err(MemoryError::InvalidConfig(
                "search.similar_limit must be > 0".to_string(),
            ));
        }

        self.weights().normalized()?;

        if !self.min_score.is_finite() || self.min_score < 0.0 {
            return Err(MemoryError::InvalidConfig(
                "search.min_score must be a finite value >= 0".to_string(),
            ));
        }

        for (name, value) in [
            ("hybrid_semantic_threshold", self.hybrid_semantic_threshold),
            ("semantic_only_threshold", self.semantic_only_threshold),
            ("similar_threshold", self.similar_threshold),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(MemoryError::InvalidConfig(format!(
                    "search.{name} must be in [-1, 1]"
                )));
            }
        }

        Ok(())
    }
}

/// BM25 parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Config {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalization strength.
    pub b: f64,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Bm25Config {
    fn validate(self) -> MemoryResult<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(MemoryError::InvalidConfig(
                "bm25.k1 must be a finite value >= 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.b) {
            return Err(MemoryError::InvalidConfig(
                "bm25.b must be in [0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}

/// Storage configuration for the entry store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Entry table name.
    pub entry_table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/memory.db"),
            entry_table: "memory_entries".to_string(),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> MemoryResult<()> {
        // Interpolated into SQL, so only plain identifiers are allowed.
        let valid = self
            .entry_table
            .bytes()
            .next()
            .is_some_and(|first| !first.is_ascii_digit())
            && self
                .entry_table
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_');
        if !valid {
            return Err(MemoryError::InvalidConfig(format!(
                "storage.entry_table is not a valid identifier: {}",
                self.entry_table
            )));
        }
        Ok(())
    }
}

/// Which embedding service answers query embeddings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// `OpenAI`-compatible `/embeddings` endpoint.
    #[default]
    OpenAi,
    /// Ollama through Rig.
    Ollama,
}

impl FromStr for EmbeddingProvider {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(MemoryError::InvalidConfig(format!(
                "unknown embedding provider: {other}"
            ))),
        }
    }
}

/// Embedding model settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding service.
    pub provider: EmbeddingProvider,
    /// Embedding model name.
    pub model: String,
    /// Embedding vector dimensions.
    pub ndims: usize,
    /// Optional custom base URL.
    pub base_url: Option<String>,
    /// API key for hosted providers. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::OpenAi,
            model: "text-embedding-3-small".to_string(),
            ndims: 1536,
            base_url: None,
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("ndims", &self.ndims)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl EmbeddingConfig {
    fn validate(&self) -> MemoryResult<()> {
        if self.ndims == 0 {
            return Err(MemoryError::InvalidConfig(
                "embedding.ndims must be > 0".to_string(),
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(MemoryError::InvalidConfig(
                "embedding.timeout_seconds must be > 0".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(MemoryError::InvalidConfig(
                "embedding.model must not be empty".to_string(),
            ));
        }

        if let Some(base_url) = &self.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MemoryConfig::default();
        config.validate().unwrap();
        assert_eq!(config.search.default_limit, 10);
        assert!((config.search.min_score - 0.1).abs() < f64::EPSILON);
        assert!((config.bm25.k1 - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.embedding.ndims, 1536);
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = MemoryConfig::default();
        config.search.lexical_weight = 0.0;
        config.search.semantic_weight = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_table_name_must_be_identifier() {
        let mut config = MemoryConfig::default();
        config.storage.entry_table = "entries; DROP TABLE x".to_string();
        assert!(config.validate().is_err());
        config.storage.entry_table = "1entries".to_string();
        assert!(config.validate().is_err());
        config.storage.entry_table = "memory_entries_v2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: MemoryConfig =
            serde_json::from_str(r#"{"search": {"default_limit": 4}, "embedding": {"provider": "ollama"}}"#)
                .unwrap();
        assert_eq!(config.search.default_limit, 4);
        assert!((config.search.lexical_weight - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.embedding.provider, EmbeddingProvider::Ollama);
    }

    #[test]
    fn test_env_overlay() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("RECALL_DB_PATH", "/tmp/recall.db"),
            ("RECALL_EMBEDDING_PROVIDER", "ollama"),
            ("RECALL_EMBEDDING_NDIMS", "768"),
            ("OPENAI_API_KEY", "sk-test"),
        ]);
        let mut config = MemoryConfig::default();
        config
            .apply_env_with(|key| vars.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.storage.sqlite_path, PathBuf::from("/tmp/recall.db"));
        assert_eq!(config.embedding.provider, EmbeddingProvider::Ollama);
        assert_eq!(config.embedding.ndims, 768);
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_api_key_is_redacted() {
        let config = EmbeddingConfig {
            api_key: Some("sk-secret".to_string()),
            ..EmbeddingConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
