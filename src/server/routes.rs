//! HTTP route handlers for the memory search API.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::memory::core::entry::EntryId;
use crate::memory::core::entry_type::EntryType;
use crate::memory::core::errors::MemoryError;
use crate::memory::retrieval::assembler::{SearchResponse, SimilarResponse};
use crate::memory::retrieval::hybrid_search::SearchMode;
use crate::memory::retrieval::weights::RankingWeights;
use crate::memory::storage::corpus_store::CorpusStats;

use super::state::AppState;

type ApiError = (StatusCode, String);

/// Create the API router with all routes, CORS and request tracing.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/memory/search", post(search_memory))
        .route("/api/memory/similar", post(similar_memory))
        .route("/api/memory/stats", get(memory_stats))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "recall-engine",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn error_response(err: &MemoryError) -> ApiError {
    let status = match err {
        MemoryError::EntryNotFound(_) | MemoryError::MissingEmbedding(_) => StatusCode::NOT_FOUND,
        MemoryError::EmbeddingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        err if err.is_invalid_input() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "memory request failed");
    }
    (status, err.to_string())
}

fn parse_entry_type(raw: Option<&str>) -> Result<Option<EntryType>, ApiError> {
    raw.map(str::parse::<EntryType>)
        .transpose()
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))
}

/// Memory search request. Omitted fields use the configured defaults.
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    /// Free-text query.
    pub query: String,
    /// Search mode.
    #[serde(default)]
    pub mode: Option<SearchMode>,
    /// Entry type filter.
    #[serde(default, rename = "type")]
    pub entry_type: Option<String>,
    /// Maximum results.
    pub limit: Option<usize>,
    /// Lexical weight.
    pub bm25_weight: Option<f64>,
    /// Semantic weight.
    pub semantic_weight: Option<f64>,
    /// Minimum fused score.
    pub min_score: Option<f64>,
    /// Cosine threshold override.
    pub threshold: Option<f64>,
    /// Allow the keyword-only fallback.
    pub allow_fallback: Option<bool>,
}

/// Handle memory search requests.
async fn search_memory(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    let entry_type = parse_entry_type(body.entry_type.as_deref())?;
    let defaults = state.searcher.request(body.query);
    let weights = RankingWeights::new(
        body.bm25_weight.unwrap_or(defaults.weights.lexical),
        body.semantic_weight.unwrap_or(defaults.weights.semantic),
    );
    let limit = body.limit.unwrap_or(defaults.limit);
    let min_score = body.min_score.unwrap_or(defaults.min_score);
    let allow_fallback = body
        .allow_fallback
        .unwrap_or(defaults.allow_keyword_fallback);

    let request = defaults
        .with_mode(body.mode.unwrap_or_default())
        .with_entry_type(entry_type)
        .with_limit(limit)
        .with_weights(weights)
        .with_min_score(min_score)
        .with_semantic_threshold(body.threshold)
        .with_keyword_fallback(allow_fallback);

    state
        .searcher
        .search(request)
        .await
        .map(Json)
        .map_err(|err| error_response(&err))
}

/// Similar-entry request.
#[derive(Debug, Deserialize)]
pub struct SimilarBody {
    /// Entry used as the query.
    pub entry_id: i64,
    /// Maximum results.
    pub limit: Option<usize>,
    /// Minimum cosine similarity.
    pub threshold: Option<f64>,
}

/// Handle similar-entry requests.
async fn similar_memory(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SimilarBody>,
) -> Result<Json<SimilarResponse>, ApiError> {
    state
        .searcher
        .find_similar(EntryId(body.entry_id), body.limit, body.threshold)
        .await
        .map(Json)
        .map_err(|err| error_response(&err))
}

/// Stats query parameters.
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    /// Entry type filter.
    #[serde(default, rename = "type")]
    pub entry_type: Option<String>,
}

/// Handle corpus statistics requests.
async fn memory_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsParams>,
) -> Result<Json<CorpusStats>, ApiError> {
    let entry_type = parse_entry_type(params.entry_type.as_deref())?;
    state
        .searcher
        .stats(entry_type)
        .await
        .map(Json)
        .map_err(|err| error_response(&err))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::memory::core::config::MemoryConfig;
    use crate::memory::core::entry::MemoryEntry;
    use crate::memory::engine::{MemorySearcher, SearchBackends};
    use crate::memory::storage::in_memory::InMemoryCorpus;

    fn router() -> Router {
        let corpus = InMemoryCorpus::new(vec![
            MemoryEntry::new(1, EntryType::Event, "token budget exceeded", 6).unwrap(),
            MemoryEntry::new(2, EntryType::Fact, "unrelated text", 4).unwrap(),
        ])
        .with_vector(1, vec![1.0, 0.0]);
        let searcher = MemorySearcher::new(
            MemoryConfig::default(),
            SearchBackends {
                corpus: Arc::new(corpus),
                embedder: None,
            },
        )
        .unwrap();
        create_router(AppState::new(searcher))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_responses_allow_any_origin() {
        let request = Request::builder()
            .uri("/health")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn test_search_degrades_without_embedder() {
        let (status, json) = send(post_json(
            "/api/memory/search",
            &serde_json::json!({"query": "token budget"}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["degraded"], true);
        assert_eq!(json["results"][0]["id"], 1);
    }

    #[tokio::test]
    async fn test_semantic_search_without_embedder_is_unavailable() {
        let (status, _) = send(post_json(
            "/api/memory/search",
            &serde_json::json!({"query": "token", "mode": "semantic_only"}),
        ))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_invalid_weights_are_bad_request() {
        let (status, _) = send(post_json(
            "/api/memory/search",
            &serde_json::json!({"query": "token", "bm25_weight": 0.0, "semantic_weight": 0.0}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_type_is_bad_request() {
        let (status, _) = send(post_json(
            "/api/memory/search",
            &serde_json::json!({"query": "token", "type": "memo"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_similar_unknown_entry_is_not_found() {
        let (status, _) = send(post_json(
            "/api/memory/similar",
            &serde_json::json!({"entry_id": 99}),
        ))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_with_type_filter() {
        let request = Request::builder()
            .uri("/api/memory/stats?type=event")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_active_entries"], 1);
        assert_eq!(json["with_embeddings"], 1);
    }
}
