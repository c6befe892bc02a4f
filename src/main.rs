//! Command-line memory search.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use recall_engine::memory::{
    EntryId, EntryType, MemorySearcher, RankingWeights, SearchMode, init_tracing,
};
use recall_engine::start_recall_server::load_config;

#[derive(Parser)]
#[command(name = "recall", about = "Hybrid BM25 + vector memory search", version)]
struct Cli {
    /// Search query.
    #[arg(long, required_unless_present_any = ["similar_to", "stats"])]
    query: Option<String>,

    /// Filter by entry type.
    #[arg(long = "type")]
    entry_type: Option<EntryType>,

    /// Maximum results.
    #[arg(long)]
    limit: Option<usize>,

    /// Weight of BM25 keyword scores.
    #[arg(long)]
    bm25_weight: Option<f64>,

    /// Weight of semantic scores.
    #[arg(long)]
    semantic_weight: Option<f64>,

    /// Minimum combined score.
    #[arg(long)]
    min_score: Option<f64>,

    /// Cosine similarity threshold override.
    #[arg(long)]
    threshold: Option<f64>,

    /// Only use semantic search.
    #[arg(long, conflicts_with = "keyword_only")]
    semantic_only: bool,

    /// Only use keyword search.
    #[arg(long)]
    keyword_only: bool,

    /// Fail instead of falling back to keyword search when embeddings are unavailable.
    #[arg(long)]
    no_fallback: bool,

    /// Find entries similar to this entry id.
    #[arg(long, conflicts_with = "query")]
    similar_to: Option<i64>,

    /// Show embedding coverage statistics.
    #[arg(long, conflicts_with_all = ["query", "similar_to"])]
    stats: bool,

    /// `SQLite` database path.
    #[arg(long, env = "RECALL_DB_PATH")]
    db: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long, env = "RECALL_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    const fn mode(&self) -> SearchMode {
        if self.semantic_only {
            SearchMode::SemanticOnly
        } else if self.keyword_only {
            SearchMode::KeywordOnly
        } else {
            SearchMode::Hybrid
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<(String, serde_json::Value)> {
    let mut config = load_config(cli.config.clone()).context("loading configuration")?;
    if let Some(db) = &cli.db {
        config.storage.sqlite_path.clone_from(db);
    }
    let searcher = MemorySearcher::from_config(config)
        .await
        .context("opening memory store")?;

    if cli.stats {
        let stats = searcher.stats(cli.entry_type).await?;
        let status = format!(
            "OK {} of {} entries embedded ({}%)",
            stats.with_embeddings, stats.total_active_entries, stats.coverage_percent
        );
        return Ok((status, serde_json::to_value(stats)?));
    }

    if let Some(id) = cli.similar_to {
        let similar = searcher
            .find_similar(EntryId(id), cli.limit, cli.threshold)
            .await?;
        let status = format!("OK Found {} similar entries", similar.results.len());
        return Ok((status, serde_json::to_value(similar)?));
    }

    let query = cli.query.clone().unwrap_or_default();
    let defaults = searcher.request(query);
    let weights = RankingWeights::new(
        cli.bm25_weight.unwrap_or(defaults.weights.lexical),
        cli.semantic_weight.unwrap_or(defaults.weights.semantic),
    );
    let limit = cli.limit.unwrap_or(defaults.limit);
    let min_score = cli.min_score.unwrap_or(defaults.min_score);
    let request = defaults
        .with_mode(cli.mode())
        .with_entry_type(cli.entry_type)
        .with_limit(limit)
        .with_weights(weights)
        .with_min_score(min_score)
        .with_semantic_threshold(cli.threshold)
        .with_keyword_fallback(!cli.no_fallback);

    let response = searcher.search(request).await?;
    let status = format!(
        "OK Found {} results using {} search",
        response.results.len(),
        response.mode
    );
    Ok((status, serde_json::to_value(response)?))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok((status, body)) => {
            println!("{status}");
            match serde_json::to_string_pretty(&body) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    println!("ERROR {err}");
                    return ExitCode::from(1);
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("ERROR {err:#}");
            ExitCode::from(1)
        }
    }
}
