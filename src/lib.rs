//! Screenward -- content-severity classification and per-app daily usage
//! statistics.
//!
//! This crate provides the severity classification engine, the per-user
//! per-day rollup store backing the statistics API, and the HTTP surface
//! that ties them together.

pub mod api;
pub mod classify;
pub mod config;
pub mod identity;
pub mod rollup;
pub mod scorer;
pub mod seed;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::ScreenwardConfig;
use crate::scorer::{DetectionScorer, HttpScorer};

/// Start the screenward daemon: storage, scorer client, and API server.
pub async fn serve(config: ScreenwardConfig) -> Result<()> {
    tracing::info!(db_path = %config.storage.db_path, "Initializing database");
    let pool = storage::open_pool(&config.storage.db_path)?;

    let scorer: Option<Arc<dyn DetectionScorer>> = match &config.scorer.url {
        Some(url) => {
            tracing::info!(%url, "Using external detection scorer");
            Some(Arc::new(HttpScorer::new(
                url.clone(),
                Duration::from_secs(config.scorer.timeout_secs),
            )?))
        }
        None => {
            tracing::info!("No scorer configured, image ingest disabled");
            None
        }
    };

    let state = api::AppState::new(pool, scorer);
    let app = api::router(state);

    let addr: std::net::SocketAddr = config.server.bind.parse()?;
    tracing::info!(%addr, "Screenward listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
