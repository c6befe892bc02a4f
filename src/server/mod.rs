//! HTTP surface of the memory searcher.
//!
//! `routes` owns the router and its middleware; this module only binds the
//! listener and drives it until the shutdown future resolves.

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::memory::core::errors::MemoryResult;

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Serve the memory API on `0.0.0.0:port` until `shutdown` completes.
///
/// # Errors
/// Returns [`crate::memory::MemoryError::Io`] if the port cannot be bound or the
/// connection loop fails.
pub async fn serve<F>(state: Arc<AppState>, port: u16, shutdown: F) -> MemoryResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "recall server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
