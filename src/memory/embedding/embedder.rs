//! Query embedders: `OpenAI`-compatible HTTP and Ollama through Rig.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use rig::client::{EmbeddingsClient, Nothing};
use rig::embeddings::EmbeddingModel;
use rig::providers::ollama;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::memory::core::config::{EmbeddingConfig, EmbeddingProvider};
use crate::memory::core::errors::{MemoryError, MemoryResult};

/// Boxed future type for embedder operations.
pub type EmbedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Turns query text into a vector comparable with stored embeddings.
pub trait QueryEmbedder: Send + Sync {
    /// Embed one query.
    ///
    /// # Errors
    /// Returns [`MemoryError::EmbeddingUnavailable`] if the service fails.
    fn embed_query(&self, text: &str) -> EmbedFuture<'_, MemoryResult<Vec<f32>>>;
    /// Expected embedding dimensionality.
    fn ndims(&self) -> usize;
}

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

fn parse_embedding_response(body: &str) -> MemoryResult<Vec<f32>> {
    let response: EmbeddingResponse = serde_json::from_str(body)?;
    response
        .data
        .into_iter()
        .next()
        .map(|data| data.embedding)
        .ok_or_else(|| MemoryError::EmbeddingUnavailable("response contained no embedding".to_string()))
}

/// Embedder for `OpenAI`-compatible `/embeddings` endpoints.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    http: ReqwestClient,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    ndims: usize,
}

impl OpenAiEmbedder {
    /// Create a new embedder from config.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn new(config: &EmbeddingConfig) -> MemoryResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_BASE_URL);
        url::Url::parse(base_url)?;

        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            ndims: config.ndims,
        })
    }

    /// Full URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl QueryEmbedder for OpenAiEmbedder {
    fn embed_query(&self, text: &str) -> EmbedFuture<'_, MemoryResult<Vec<f32>>> {
        let text = text.to_string();
        Box::pin(async move {
            let api_key = self.api_key.as_deref().ok_or_else(|| {
                MemoryError::EmbeddingUnavailable("OPENAI_API_KEY is not set".to_string())
            })?;

            let response = self
                .http
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .json(&EmbeddingRequest {
                    model: &self.model,
                    input: &text,
                    encoding_format: "float",
                })
                .send()
                .await
                .map_err(|err| MemoryError::EmbeddingUnavailable(err.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|err| MemoryError::EmbeddingUnavailable(err.to_string()))?;
            if !status.is_success() {
                return Err(MemoryError::EmbeddingUnavailable(format!(
                    "embedding service returned {status}: {body}"
                )));
            }

            let vector = parse_embedding_response(&body)
                .map_err(|err| MemoryError::EmbeddingUnavailable(err.to_string()))?;
            debug!(model = %self.model, dims = vector.len(), "embedded query");
            Ok(vector)
        })
    }

    fn ndims(&self) -> usize {
        self.ndims
    }
}

type OllamaEmbeddingModel = ollama::EmbeddingModel<ReqwestClient>;

/// Ollama embedder using Rig provider.
#[derive(Clone)]
pub struct OllamaEmbedder {
    model: OllamaEmbeddingModel,
    ndims: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder from config.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn new(config: &EmbeddingConfig) -> MemoryResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(Nothing);
        let builder = if let Some(base_url) = &config.base_url {
            url::Url::parse(base_url)?;
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(MemoryError::from)?;
        let model = client.embedding_model_with_ndims(config.model.clone(), config.ndims);
        Ok(Self {
            model,
            ndims: config.ndims,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(values: &[f64]) -> Vec<f32> {
    values.iter().map(|value| *value as f32).collect()
}

impl QueryEmbedder for OllamaEmbedder {
    fn embed_query(&self, text: &str) -> EmbedFuture<'_, MemoryResult<Vec<f32>>> {
        let text = text.to_string();
        Box::pin(async move {
            let embedding = self
                .model
                .embed_text(&text)
                .await
                .map_err(|err| MemoryError::EmbeddingUnavailable(err.to_string()))?;
            Ok(narrow(&embedding.vec))
        })
    }

    fn ndims(&self) -> usize {
        self.ndims
    }
}

/// Build the embedder selected by `config.provider`.
///
/// # Errors
/// Returns an error if the embedder cannot be constructed.
pub fn build_embedder(config: &EmbeddingConfig) -> MemoryResult<Arc<dyn QueryEmbedder>> {
    let embedder: Arc<dyn QueryEmbedder> = match config.provider {
        EmbeddingProvider::OpenAi => Arc::new(OpenAiEmbedder::new(config)?),
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(config)?),
    };
    Ok(embedder)
}
