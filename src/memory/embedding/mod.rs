//! Query embedding clients.

pub mod embedder;

pub use embedder::{EmbedFuture, OllamaEmbedder, OpenAiEmbedder, QueryEmbedder, build_embedder};
