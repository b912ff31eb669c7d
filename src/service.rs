// src/service.rs
//! Wiring: config → store → cache → router → chain → filter.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::cache::{CacheStore, DateCache, JsonFileStore, MemoryStore, SweepReport};
use crate::chain::FallbackChain;
use crate::config::FreshnessConfig;
use crate::estimators::UniversalEstimator;
use crate::fetch::{PageFetcher, ReqwestFetcher};
use crate::filter::{BatchOutcome, FreshnessFilter};
use crate::inclusion::FallbackInclusion;
use crate::router::StrategyRouter;
use crate::types::{CandidateItem, DateEstimate};

pub struct FreshnessService {
    config: FreshnessConfig,
    cache: Arc<DateCache>,
    filter: FreshnessFilter,
}

impl FreshnessService {
    /// Production wiring: JSON file store (if configured) and a reqwest fetcher.
    pub async fn from_config(config: FreshnessConfig) -> Result<Self> {
        let store: Arc<dyn CacheStore> = match &config.cache.store_dir {
            Some(dir) => Arc::new(JsonFileStore::open(dir).await?),
            None => Arc::new(MemoryStore::new()),
        };
        let fetcher = Arc::new(ReqwestFetcher::new(
            &config.engine.user_agent,
            config.connect_timeout(),
        )?);
        Ok(Self::with_parts(config, store, fetcher))
    }

    pub fn with_parts(
        config: FreshnessConfig,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        tracing::info!(
            target: "freshness",
            store = store.name(),
            fetcher = fetcher.name(),
            workers = config.engine.worker_pool_size,
            "freshness service starting"
        );
        let cache = Arc::new(DateCache::new(store, config.cache.memory_capacity));
        let universal = Arc::new(UniversalEstimator::new(fetcher, config.request_timeout()));
        let chain = FallbackChain::new(
            StrategyRouter::with_builtin(universal),
            Arc::clone(&cache),
            config.source_policies(),
        );
        let filter = FreshnessFilter::new(
            Arc::new(chain),
            Arc::new(FallbackInclusion::new(config.inclusion.clone())),
            config.filter_settings(),
        );
        Self {
            config,
            cache,
            filter,
        }
    }

    pub fn config(&self) -> &FreshnessConfig {
        &self.config
    }

    pub fn filter(&self) -> &FreshnessFilter {
        &self.filter
    }

    pub fn cache(&self) -> &Arc<DateCache> {
        &self.cache
    }

    /// Filter a batch and flush its counters to the metrics recorder.
    pub async fn run_batch(&self, items: Vec<CandidateItem>, now: DateTime<Utc>) -> BatchOutcome {
        let outcome = self.filter.run(items, now).await;
        outcome.stats.flush();
        outcome
    }

    /// Estimate a single item without a filtering decision.
    pub async fn estimate_one(&self, item: &CandidateItem, now: DateTime<Utc>) -> DateEstimate {
        let run = self.filter.new_run();
        let estimate = self.filter.chain().estimate(item, now, &run).await;
        run.stats.snapshot().flush();
        estimate
    }

    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        self.cache
            .sweep(now, self.config.retention(), self.config.cache.confidence_floor)
            .await
    }
}

/// Periodic cache maintenance. Wire this from app startup; no-op when the interval is 0.
pub fn spawn_cache_sweeper(service: Arc<FreshnessService>) {
    let secs = service.config.cache.sweep_interval_secs;
    if secs == 0 {
        return;
    }
    let period = std::time::Duration::from_secs(secs);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            let _ = service.sweep(Utc::now()).await;
        }
    });
}
