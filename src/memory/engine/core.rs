//! Search orchestration.
//!
//! A search takes one snapshot of the corpus, embeds the query if the mode
//! needs it, then runs the lexical and semantic passes on the blocking pool
//! against that shared snapshot before fusing and assembling results.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::memory::core::config::MemoryConfig;
use crate::memory::core::entry::EntryId;
use crate::memory::core::entry_type::EntryType;
use crate::memory::core::errors::{MemoryError, MemoryResult};
use crate::memory::embedding::embedder::{QueryEmbedder, build_embedder};
use crate::memory::retrieval::assembler::{ResultAssembler, SearchResponse, SimilarResponse};
use crate::memory::retrieval::hybrid_search::{
    HybridRanker, RankedCandidates, ScoredCandidate, SearchMode, SearchRequest,
};
use crate::memory::retrieval::semantic::VectorScorer;
use crate::memory::retrieval::tokenizer::tokenize;
use crate::memory::storage::corpus_store::{CorpusSnapshot, CorpusSource, CorpusStats, take_snapshot};
use crate::memory::storage::sqlite_corpus::SqliteCorpusStore;

const NO_ENTRIES_MESSAGE: &str = "No entries found";
const NO_TOKENS_MESSAGE: &str = "Query contains no searchable terms";

/// Backend dependencies for the searcher.
#[derive(Clone)]
pub struct SearchBackends {
    /// Source of entries and embeddings.
    pub corpus: Arc<dyn CorpusSource>,
    /// Query embedder; `None` disables semantic scoring.
    pub embedder: Option<Arc<dyn QueryEmbedder>>,
}

impl SearchBackends {
    /// Build the `SQLite` corpus and the configured embedder.
    ///
    /// # Errors
    /// Returns an error if any backend cannot be initialized.
    pub async fn sqlite(config: &MemoryConfig) -> MemoryResult<Self> {
        let corpus = Arc::new(SqliteCorpusStore::open(&config.storage).await?);
        let embedder = build_embedder(&config.embedding)?;

        Ok(Self {
            corpus,
            embedder: Some(embedder),
        })
    }
}

/// Hybrid memory search over a corpus source.
#[derive(Clone)]
pub struct MemorySearcher {
    config: MemoryConfig,
    corpus: Arc<dyn CorpusSource>,
    embedder: Option<Arc<dyn QueryEmbedder>>,
    ranker: HybridRanker,
}

impl MemorySearcher {
    /// Create a new searcher.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: MemoryConfig, backends: SearchBackends) -> MemoryResult<Self> {
        config.validate()?;
        let ranker = HybridRanker::from_config(&config);

        Ok(Self {
            config,
            corpus: backends.corpus,
            embedder: backends.embedder,
            ranker,
        })
    }

    /// Create a new searcher using `SQLite` backends.
    ///
    /// # Errors
    /// Returns an error if backends cannot be initialized.
    pub async fn from_config(config: MemoryConfig) -> MemoryResult<Self> {
        let backends = SearchBackends::sqlite(&config).await?;
        Self::new(config, backends)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// A request pre-filled with the configured defaults.
    #[must_use]
    pub fn request(&self, query: impl Into<String>) -> SearchRequest {
        SearchRequest::from_config(query, &self.config)
    }

    /// Run a search.
    ///
    /// # Errors
    /// Returns an error for invalid requests, storage failures, dimension
    /// mismatches, and embedding failures that cannot fall back.
    pub async fn search(&self, request: SearchRequest) -> MemoryResult<SearchResponse> {
        request.validate()?;
        let weights = request.weights.normalized()?;

        let snapshot = Arc::new(take_snapshot(self.corpus.as_ref(), request.entry_type).await?);
        debug!(
            entries = snapshot.len(),
            embedded = snapshot.embedded_len(),
            entry_type = ?request.entry_type,
            "took corpus snapshot"
        );

        if snapshot.is_empty() {
            return Ok(SearchResponse::empty(
                request.query,
                request.mode,
                weights,
                Some(NO_ENTRIES_MESSAGE.to_string()),
            ));
        }
        if request.limit == 0 {
            return Ok(SearchResponse::empty(request.query, request.mode, weights, None));
        }

        let query_tokens = tokenize(&request.query);
        let has_tokens = !query_tokens.is_empty();

        let mut mode = request.mode;
        let mut degraded = false;
        let query_vector = if mode.needs_embedding() {
            match self.embed(&request.query).await {
                Ok(vector) => Some(vector),
                Err(err)
                    if mode == SearchMode::Hybrid
                        && request.allow_keyword_fallback
                        && err.allows_keyword_fallback() =>
                {
                    warn!(error = %err, "query embedding unavailable, falling back to keyword search");
                    mode = SearchMode::KeywordOnly;
                    degraded = true;
                    None
                }
                Err(err) => return Err(err),
            }
        } else {
            None
        };

        let ranked = self
            .rank_concurrently(&request, mode, query_tokens, query_vector, Arc::clone(&snapshot))
            .await?;

        let mut response = ResultAssembler.assemble(&request.query, weights, &ranked, &snapshot);
        response.degraded = degraded;
        if !has_tokens && mode == SearchMode::KeywordOnly {
            response.message = Some(NO_TOKENS_MESSAGE.to_string());
        }

        info!(
            mode = %response.mode,
            degraded,
            candidates = response.total_candidates,
            above_threshold = response.above_threshold,
            returned = response.results.len(),
            "memory search complete"
        );
        Ok(response)
    }

    /// Entries most similar to an existing entry, by stored embedding.
    ///
    /// Defaults to the configured similar-entry limit and threshold.
    ///
    /// # Errors
    /// Returns [`MemoryError::EntryNotFound`] for unknown or inactive ids and
    /// [`MemoryError::MissingEmbedding`] when the entry was never embedded.
    pub async fn find_similar(
        &self,
        entry_id: EntryId,
        limit: Option<usize>,
        threshold: Option<f64>,
    ) -> MemoryResult<SimilarResponse> {
        let limit = limit.unwrap_or(self.config.search.similar_limit);
        let threshold = threshold.unwrap_or(self.config.search.similar_threshold);

        let snapshot = Arc::new(take_snapshot(self.corpus.as_ref(), None).await?);
        let source = snapshot
            .entry(entry_id)
            .ok_or(MemoryError::EntryNotFound(entry_id))?;
        let source_content = source.content.clone();
        if snapshot.vector(entry_id).is_none() {
            return Err(MemoryError::MissingEmbedding(entry_id));
        }

        let scoring_snapshot = Arc::clone(&snapshot);
        let outcome = tokio::task::spawn_blocking(move || {
            let source_vector = scoring_snapshot
                .vector(entry_id)
                .ok_or(MemoryError::MissingEmbedding(entry_id))?;
            VectorScorer.search(
                source_vector,
                scoring_snapshot.vectors().filter(|(id, _)| *id != entry_id),
                threshold,
                limit,
            )
        })
        .await??;

        let candidates: Vec<ScoredCandidate> = outcome
            .hits
            .iter()
            .map(|hit| ScoredCandidate {
                id: hit.id,
                lexical_score: None,
                semantic_score: Some(hit.similarity),
                combined_score: hit.similarity,
            })
            .collect();

        debug!(%entry_id, compared = outcome.searched, found = candidates.len(), "similar entries");
        Ok(SimilarResponse {
            source_id: entry_id,
            source_content,
            results: ResultAssembler.results(&candidates, &snapshot),
            total_compared: outcome.searched,
        })
    }

    /// Embedding coverage of the active corpus.
    ///
    /// # Errors
    /// Returns an error if the corpus cannot be read.
    pub async fn stats(&self, entry_type: Option<EntryType>) -> MemoryResult<CorpusStats> {
        let snapshot = take_snapshot(self.corpus.as_ref(), entry_type).await?;
        Ok(snapshot.stats())
    }

    async fn embed(&self, text: &str) -> MemoryResult<Vec<f32>> {
        let embedder = self.embedder.as_ref().ok_or_else(|| {
            MemoryError::EmbeddingUnavailable("no embedder configured".to_string())
        })?;
        let vector = embedder.embed_query(text).await?;
        if vector.len() != embedder.ndims() {
            return Err(MemoryError::DimensionMismatch {
                expected: embedder.ndims(),
                found: vector.len(),
            });
        }
        Ok(vector)
    }

    async fn rank_concurrently(
        &self,
        request: &SearchRequest,
        mode: SearchMode,
        query_tokens: Vec<String>,
        query_vector: Option<Vec<f32>>,
        snapshot: Arc<CorpusSnapshot>,
    ) -> MemoryResult<RankedCandidates> {
        let ranker = self.ranker;
        let limit = request.limit;
        let pool = ranker.candidate_pool(mode, limit);
        let threshold = ranker.semantic_threshold(mode, request.semantic_threshold);
        let require_vector = |vector: Option<Vec<f32>>| {
            vector.ok_or_else(|| {
                MemoryError::EmbeddingUnavailable("no query embedding available".to_string())
            })
        };

        match mode {
            SearchMode::KeywordOnly => {
                let lexical = tokio::task::spawn_blocking(move || {
                    ranker.lexical_pass(&query_tokens, snapshot.documents(), pool)
                })
                .await?;
                Ok(HybridRanker::keyword_only(&lexical, limit))
            }
            SearchMode::SemanticOnly => {
                let vector = require_vector(query_vector)?;
                let semantic = tokio::task::spawn_blocking(move || {
                    ranker.semantic_pass(&vector, &snapshot, threshold, pool)
                })
                .await??;
                Ok(HybridRanker::semantic_only(&semantic, limit))
            }
            SearchMode::Hybrid => {
                let vector = require_vector(query_vector)?;
                let lexical_snapshot = Arc::clone(&snapshot);
                let lexical = tokio::task::spawn_blocking(move || {
                    ranker.lexical_pass(&query_tokens, lexical_snapshot.documents(), pool)
                });
                let semantic = tokio::task::spawn_blocking(move || {
                    ranker.semantic_pass(&vector, &snapshot, threshold, pool)
                });

                let (lexical, semantic) = tokio::try_join!(lexical, semantic)?;
                let semantic = semantic?;
                debug!(
                    lexical_hits = lexical.hits.len(),
                    lexical_strategy = ?lexical.strategy,
                    semantic_hits = semantic.hits.len(),
                    "scoring passes complete"
                );
                HybridRanker::fuse(
                    &lexical,
                    &semantic,
                    request.weights,
                    request.min_score,
                    limit,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::memory::core::entry::MemoryEntry;
    use crate::memory::embedding::embedder::EmbedFuture;
    use crate::memory::retrieval::weights::RankingWeights;
    use crate::memory::storage::in_memory::InMemoryCorpus;

    struct FixedEmbedder {
        vector: Vec<f32>,
        ndims: usize,
        calls: AtomicUsize,
    }

    impl FixedEmbedder {
        fn new(vector: Vec<f32>) -> Arc<Self> {
            let ndims = vector.len();
            Self::with_ndims(vector, ndims)
        }

        fn with_ndims(vector: Vec<f32>, ndims: usize) -> Arc<Self> {
            Arc::new(Self {
                vector,
                ndims,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl QueryEmbedder for FixedEmbedder {
        fn embed_query(&self, _text: &str) -> EmbedFuture<'_, MemoryResult<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let vector = self.vector.clone();
            Box::pin(async move { Ok(vector) })
        }

        fn ndims(&self) -> usize {
            self.ndims
        }
    }

    struct FailingEmbedder;

    impl QueryEmbedder for FailingEmbedder {
        fn embed_query(&self, _text: &str) -> EmbedFuture<'_, MemoryResult<Vec<f32>>> {
            Box::pin(async { Err(MemoryError::EmbeddingUnavailable("service down".to_string())) })
        }

        fn ndims(&self) -> usize {
            2
        }
    }

    fn entry(id: i64, entry_type: EntryType, content: &str) -> MemoryEntry {
        MemoryEntry::new(id, entry_type, content, 5).unwrap()
    }

    fn build_searcher(corpus: InMemoryCorpus, embedder: Option<Arc<dyn QueryEmbedder>>) -> MemorySearcher {
        MemorySearcher::new(
            MemoryConfig::default(),
            SearchBackends {
                corpus: Arc::new(corpus),
                embedder,
            },
        )
        .unwrap()
    }

    fn budget_corpus() -> InMemoryCorpus {
        InMemoryCorpus::new(vec![
            entry(1, EntryType::Event, "token budget exceeded"),
            entry(2, EntryType::Fact, "unrelated text"),
        ])
        .with_vector(1, vec![0.9, 0.1])
        .with_vector(2, vec![0.0, 1.0])
    }

    fn ids(response: &SearchResponse) -> Vec<i64> {
        response.results.iter().map(|r| r.id.get()).collect()
    }

    #[tokio::test]
    async fn test_empty_corpus_reports_message() {
        let searcher = build_searcher(InMemoryCorpus::default(), None);
        let response = searcher.search(searcher.request("anything")).await.unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.message.as_deref(), Some(NO_ENTRIES_MESSAGE));
    }

    #[tokio::test]
    async fn test_hybrid_ranks_matching_entry_first() {
        let searcher = build_searcher(budget_corpus(), Some(FixedEmbedder::new(vec![1.0, 0.0])));
        let response = searcher.search(searcher.request("token budget")).await.unwrap();

        assert_eq!(response.mode, SearchMode::Hybrid);
        assert_eq!(ids(&response), vec![1]);
        let top = &response.results[0];
        assert!(top.lexical_score.is_some());
        assert!(top.semantic_score.is_some());
        assert!(!response.degraded);
    }

    #[tokio::test]
    async fn test_hybrid_falls_back_when_embedder_fails() {
        let searcher = build_searcher(budget_corpus(), Some(Arc::new(FailingEmbedder)));
        let response = searcher.search(searcher.request("token budget")).await.unwrap();

        assert!(response.degraded);
        assert_eq!(response.mode, SearchMode::KeywordOnly);
        assert_eq!(ids(&response), vec![1]);
        assert!(response.results[0].semantic_score.is_none());
    }

    #[tokio::test]
    async fn test_hybrid_without_embedder_falls_back() {
        let searcher = build_searcher(budget_corpus(), None);
        let response = searcher.search(searcher.request("token budget")).await.unwrap();
        assert!(response.degraded);
        assert_eq!(ids(&response), vec![1]);
    }

    #[tokio::test]
    async fn test_fallback_can_be_disabled() {
        let searcher = build_searcher(budget_corpus(), Some(Arc::new(FailingEmbedder)));
        let err = searcher
            .search(searcher.request("token budget").with_keyword_fallback(false))
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryError::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_semantic_only_never_falls_back() {
        let searcher = build_searcher(budget_corpus(), Some(Arc::new(FailingEmbedder)));
        let err = searcher
            .search(
                searcher
                    .request("token budget")
                    .with_mode(SearchMode::SemanticOnly),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryError::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_keyword_only_skips_embedder() {
        let embedder = FixedEmbedder::new(vec![1.0, 0.0]);
        let searcher = build_searcher(budget_corpus(), Some(embedder.clone()));
        let response = searcher
            .search(searcher.request("budget").with_mode(SearchMode::KeywordOnly))
            .await
            .unwrap();

        assert_eq!(ids(&response), vec![1]);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_semantic_only_single_exact_match() {
        let corpus = InMemoryCorpus::new(vec![entry(7, EntryType::Insight, "dark mode")])
            .with_vector(7, vec![0.3, 0.4, 0.5]);
        let searcher = build_searcher(corpus, Some(FixedEmbedder::new(vec![0.3, 0.4, 0.5])));
        let response = searcher
            .search(searcher.request("ui theme").with_mode(SearchMode::SemanticOnly))
            .await
            .unwrap();

        assert_eq!(ids(&response), vec![7]);
        let score = response.results[0].semantic_score.unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_type_filter_narrows_both_passes() {
        let searcher = build_searcher(budget_corpus(), Some(FixedEmbedder::new(vec![0.0, 1.0])));
        let response = searcher
            .search(
                searcher
                    .request("token budget")
                    .with_entry_type(Some(EntryType::Fact))
                    .with_min_score(0.0),
            )
            .await
            .unwrap();
        assert_eq!(ids(&response), vec![2]);
        assert!(response.results[0].lexical_score.is_none());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_fatal() {
        let searcher = build_searcher(budget_corpus(), Some(FixedEmbedder::new(vec![1.0, 0.0, 0.0])));
        let err = searcher.search(searcher.request("token")).await.unwrap_err();
        assert!(matches!(
            err,
            MemoryError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_zero_weights_rejected_before_search() {
        let searcher = build_searcher(budget_corpus(), None);
        let err = searcher
            .search(
                searcher
                    .request("token")
                    .with_weights(RankingWeights::new(0.0, 0.0)),
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_query_without_tokens_reports_message() {
        let searcher = build_searcher(budget_corpus(), None);
        let response = searcher
            .search(searcher.request("?!").with_mode(SearchMode::KeywordOnly))
            .await
            .unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.message.as_deref(), Some(NO_TOKENS_MESSAGE));
    }

    #[tokio::test]
    async fn test_embedding_with_unexpected_width_is_rejected() {
        let searcher = build_searcher(
            budget_corpus(),
            Some(FixedEmbedder::with_ndims(vec![1.0, 0.0], 1536)),
        );
        let err = searcher.search(searcher.request("token budget")).await.unwrap_err();
        assert!(matches!(
            err,
            MemoryError::DimensionMismatch {
                expected: 1536,
                found: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_hybrid_query_without_tokens_still_searches_semantically() {
        let searcher = build_searcher(budget_corpus(), Some(FixedEmbedder::new(vec![1.0, 0.0])));
        let response = searcher.search(searcher.request("?!")).await.unwrap();

        assert_eq!(response.mode, SearchMode::Hybrid);
        assert!(!response.degraded);
        assert!(response.message.is_none());
        assert_eq!(ids(&response), vec![1]);
        assert!(response.results.iter().all(|r| r.lexical_score.is_none()));
        assert!(response.results[0].semantic_score.is_some());
    }

    fn budget_heavy_corpus() -> InMemoryCorpus {
        InMemoryCorpus::new(vec![
            entry(1, EntryType::Fact, "budget review"),
            entry(2, EntryType::Fact, "budget cuts"),
            entry(3, EntryType::Fact, "annual budget"),
            entry(4, EntryType::Fact, "travel plans"),
        ])
        .with_vector(1, vec![1.0, 0.0])
        .with_vector(2, vec![0.9, 0.1])
        .with_vector(3, vec![0.8, 0.2])
        .with_vector(4, vec![0.0, 1.0])
    }

    #[tokio::test]
    async fn test_single_signal_counts_ignore_limit() {
        let searcher = build_searcher(budget_heavy_corpus(), Some(FixedEmbedder::new(vec![1.0, 0.0])));

        let semantic = searcher
            .search(
                searcher
                    .request("budget")
                    .with_mode(SearchMode::SemanticOnly)
                    .with_limit(1),
            )
            .await
            .unwrap();
        assert_eq!(semantic.results.len(), 1);
        assert_eq!(semantic.total_candidates, 4);
        assert_eq!(semantic.above_threshold, 3);

        let keyword = searcher
            .search(
                searcher
                    .request("budget")
                    .with_mode(SearchMode::KeywordOnly)
                    .with_limit(1),
            )
            .await
            .unwrap();
        assert_eq!(keyword.results.len(), 1);
        assert_eq!(keyword.total_candidates, 4);
        assert_eq!(keyword.above_threshold, 3);
    }

    #[tokio::test]
    async fn test_lexical_weight_only_reproduces_keyword_order() {
        let corpus = InMemoryCorpus::new(vec![
            entry(1, EntryType::Fact, "rust search engine"),
            entry(2, EntryType::Fact, "search search search"),
            entry(3, EntryType::Fact, "gardening tips"),
            entry(4, EntryType::Fact, "rust"),
        ])
        .with_vector(1, vec![0.0, 1.0])
        .with_vector(2, vec![1.0, 0.0])
        .with_vector(3, vec![1.0, 0.0])
        .with_vector(4, vec![0.5, 0.5]);
        let searcher = build_searcher(corpus, Some(FixedEmbedder::new(vec![1.0, 0.0])));

        let keyword = searcher
            .search(searcher.request("rust search").with_mode(SearchMode::KeywordOnly))
            .await
            .unwrap();
        let hybrid = searcher
            .search(
                searcher
                    .request("rust search")
                    .with_weights(RankingWeights::new(1.0, 0.0))
                    .with_min_score(0.0),
            )
            .await
            .unwrap();

        let keyword_ids = ids(&keyword);
        assert!(!keyword_ids.is_empty());
        let hybrid_shared: Vec<i64> = ids(&hybrid)
            .into_iter()
            .filter(|id| keyword_ids.contains(id))
            .collect();
        assert_eq!(hybrid_shared, keyword_ids);
    }

    #[tokio::test]
    async fn test_zero_limit_returns_nothing_without_embedding() {
        let embedder = FixedEmbedder::new(vec![1.0, 0.0]);
        let searcher = build_searcher(budget_corpus(), Some(embedder.clone()));
        let response = searcher
            .search(searcher.request("token budget").with_limit(0))
            .await
            .unwrap();

        assert!(response.results.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_repeated_search_is_identical() {
        let searcher = build_searcher(budget_heavy_corpus(), Some(FixedEmbedder::new(vec![1.0, 0.0])));
        let first = searcher.search(searcher.request("budget review")).await.unwrap();
        let second = searcher.search(searcher.request("budget review")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.results[0].id, EntryId(1));
    }

    #[tokio::test]
    async fn test_find_similar_excludes_source() {
        let corpus = InMemoryCorpus::new(vec![
            entry(1, EntryType::Fact, "likes green tea"),
            entry(2, EntryType::Fact, "drinks tea daily"),
            entry(3, EntryType::Task, "renew passport"),
        ])
        .with_vector(1, vec![1.0, 0.0])
        .with_vector(2, vec![0.9, 0.2])
        .with_vector(3, vec![0.0, 1.0]);
        let searcher = build_searcher(corpus, None);

        let similar = searcher.find_similar(EntryId(1), None, None).await.unwrap();
        assert_eq!(similar.source_content, "likes green tea");
        assert_eq!(similar.total_compared, 2);
        let found: Vec<i64> = similar.results.iter().map(|r| r.id.get()).collect();
        assert_eq!(found, vec![2]);
    }

    #[tokio::test]
    async fn test_find_similar_errors() {
        let searcher = build_searcher(budget_corpus(), None);
        let missing = searcher.find_similar(EntryId(42), None, None).await.unwrap_err();
        assert!(matches!(missing, MemoryError::EntryNotFound(EntryId(42))));

        let corpus = InMemoryCorpus::new(vec![entry(5, EntryType::Fact, "no vector")]);
        let unembedded = build_searcher(corpus, None);
        let err = unembedded.find_similar(EntryId(5), None, None).await.unwrap_err();
        assert!(matches!(err, MemoryError::MissingEmbedding(EntryId(5))));
    }

    #[tokio::test]
    async fn test_stats_reports_coverage() {
        let corpus = InMemoryCorpus::new(vec![
            entry(1, EntryType::Fact, "a1"),
            entry(2, EntryType::Fact, "b2"),
        ])
        .with_vector(1, vec![1.0]);
        let searcher = build_searcher(corpus, None);

        let stats = searcher.stats(None).await.unwrap();
        assert_eq!(stats.with_embeddings, 1);
        assert!((stats.coverage_percent - 50.0).abs() < f64::EPSILON);
    }
}
