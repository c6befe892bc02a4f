//! Startup helpers for the recall server.

use std::path::PathBuf;
use std::process::ExitCode;

use crate::memory::adapters::init_tracing;
use crate::memory::core::config::MemoryConfig;
use crate::memory::core::errors::MemoryResult;
use crate::server::{self, AppState};

/// Run the server (used by the `recall-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();

    tracing::info!("Starting recall server v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_config(std::env::var("RECALL_CONFIG").ok().map(PathBuf::from)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!(
        db = %config.storage.sqlite_path.display(),
        provider = ?config.embedding.provider,
        model = %config.embedding.model,
        "configuration loaded"
    );

    let port = get_port();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = rt.block_on(async move {
        let state = AppState::from_config(config).await?;
        server::serve(state, port, shutdown_signal()).await
    });

    if let Err(e) = result {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Load configuration from an optional JSON file, then overlay the environment.
///
/// # Errors
/// Returns an error if the file is unreadable or the result fails validation.
pub fn load_config(path: Option<PathBuf>) -> MemoryResult<MemoryConfig> {
    let mut config = match path {
        Some(path) => MemoryConfig::load(path)?,
        None => MemoryConfig::default(),
    };
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

/// Get configured server port.
#[must_use]
pub fn get_port() -> u16 {
    std::env::var("RECALL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(server::DEFAULT_PORT)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"search": {{"default_limit": 3}}}}"#).unwrap();

        let config = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.search.default_limit, 3);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bm25": {{"b": 2.0}}}}"#).unwrap();

        assert!(load_config(Some(file.path().to_path_buf())).is_err());
    }
}
