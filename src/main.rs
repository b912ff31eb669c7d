//! News Freshness Service: Binary Entrypoint
//! Boots the Axum HTTP server: config, cache store, estimator registry, metrics.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_freshness::api::{create_router, AppState};
use news_freshness::config;
use news_freshness::metrics::Metrics;
use news_freshness::service::{spawn_cache_sweeper, FreshnessService};

/// Compact logs by default; JSON lines when FRESHNESS_LOG_FORMAT=json.
/// The runtime may already own the global subscriber; that is not an error.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_freshness=info,warn"));

    let json = std::env::var("FRESHNESS_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
            .ok();
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default().context("loading freshness config")?;
    let metrics = Metrics::init(cfg.cache.memory_capacity, cfg.cache.retention_days)?;

    let service = Arc::new(
        FreshnessService::from_config(cfg)
            .await
            .context("building freshness service")?,
    );
    spawn_cache_sweeper(Arc::clone(&service));

    let router = create_router(AppState { service }).merge(metrics.router());

    Ok(router.into())
}
