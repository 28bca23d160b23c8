//! Media Cache Service - pull-through cache for remote media and metadata
//!
//! Downloads media on first request into a flat cache directory, keeps
//! companion metadata records next to it, and sweeps out stale entries.

mod config;
mod error;
mod server;
mod sweeper;
mod types;

use crate::config::Config;
use crate::error::{MediaCacheServiceError, Result};
use crate::server::{start_server, ServerState, SharedState};
use crate::sweeper::spawn_sweeper;
use media_cache_store::{CacheStore, HttpDownloader};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("media_cache_service=info".parse()?)
        .add_directive("media_cache_store=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if config.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting media cache service...");
    info!("Port: {}", config.port);
    info!("Cache dir: {:?}", config.cache_dir);
    info!("Max entry age: {} seconds", config.max_age.as_secs());
    info!("Sweep interval: {} seconds", config.sweep_interval.as_secs());

    let downloader = HttpDownloader::with_timeout(config.download_timeout)?;
    let cache = CacheStore::new(config.cache_dir.clone(), Arc::new(downloader));
    cache.init().await?;

    let state: SharedState = Arc::new(ServerState::new(cache, config.max_age));

    let _sweeper = spawn_sweeper(state.clone(), config.sweep_interval);

    // Start HTTP server (blocking)
    start_server(state, config.port)
        .await
        .map_err(|e| MediaCacheServiceError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
