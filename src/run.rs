// src/run.rs
//! Per-run state passed explicitly through the chain: counters, the content-scan
//! fetch budget, and the small response cache. Nothing here outlives a run.

use metrics::counter;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::types::EstimateMethod;

/// Counters collected during one run and flushed by the caller at the end.
#[derive(Debug, Default)]
pub struct RunStats {
    items: AtomicU64,
    probes: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_errors: AtomicU64,
    cache_writes: AtomicU64,
    by_metadata: AtomicU64,
    by_url: AtomicU64,
    by_position: AtomicU64,
    by_pattern: AtomicU64,
    by_content: AtomicU64,
    failed: AtomicU64,
    fetches: AtomicU64,
    fetch_failures: AtomicU64,
    fetch_skipped: AtomicU64,
    included: AtomicU64,
    fallback_included: AtomicU64,
    excluded: AtomicU64,
}

/// Plain copy of [`RunStats`] for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatsSnapshot {
    pub items: u64,
    pub probes: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_errors: u64,
    pub cache_writes: u64,
    pub by_metadata: u64,
    pub by_url: u64,
    pub by_position: u64,
    pub by_pattern: u64,
    pub by_content: u64,
    pub failed: u64,
    pub fetches: u64,
    pub fetch_failures: u64,
    pub fetch_skipped: u64,
    pub included: u64,
    pub fallback_included: u64,
    pub excluded: u64,
}

fn bump(c: &AtomicU64) {
    c.fetch_add(1, Ordering::Relaxed);
}

impl RunStats {
    pub fn record_item(&self) {
        bump(&self.items);
    }
    pub fn record_probe(&self) {
        bump(&self.probes);
    }
    pub fn record_cache_hit(&self) {
        bump(&self.cache_hits);
    }
    pub fn record_cache_miss(&self) {
        bump(&self.cache_misses);
    }
    pub fn record_cache_error(&self) {
        bump(&self.cache_errors);
    }
    pub fn record_cache_write(&self) {
        bump(&self.cache_writes);
    }
    pub fn record_fetch(&self, ok: bool) {
        bump(&self.fetches);
        if !ok {
            bump(&self.fetch_failures);
        }
    }
    pub fn record_fetch_skipped(&self) {
        bump(&self.fetch_skipped);
    }

    /// Count the step that produced the final (non-cached) estimate.
    pub fn record_method(&self, method: EstimateMethod) {
        match method {
            EstimateMethod::Metadata => bump(&self.by_metadata),
            EstimateMethod::UrlPattern => bump(&self.by_url),
            EstimateMethod::RssPosition => bump(&self.by_position),
            EstimateMethod::PublishingPattern => bump(&self.by_pattern),
            EstimateMethod::ContentScan => bump(&self.by_content),
            EstimateMethod::Failed => bump(&self.failed),
            EstimateMethod::Cache => {}
        }
    }

    pub fn record_decision(&self, included: bool, fallback: bool) {
        match (included, fallback) {
            (true, true) => {
                bump(&self.included);
                bump(&self.fallback_included);
            }
            (true, false) => bump(&self.included),
            (false, _) => bump(&self.excluded),
        }
    }

    pub fn snapshot(&self) -> RunStatsSnapshot {
        let g = |c: &AtomicU64| c.load(Ordering::Relaxed);
        RunStatsSnapshot {
            items: g(&self.items),
            probes: g(&self.probes),
            cache_hits: g(&self.cache_hits),
            cache_misses: g(&self.cache_misses),
            cache_errors: g(&self.cache_errors),
            cache_writes: g(&self.cache_writes),
            by_metadata: g(&self.by_metadata),
            by_url: g(&self.by_url),
            by_position: g(&self.by_position),
            by_pattern: g(&self.by_pattern),
            by_content: g(&self.by_content),
            failed: g(&self.failed),
            fetches: g(&self.fetches),
            fetch_failures: g(&self.fetch_failures),
            fetch_skipped: g(&self.fetch_skipped),
            included: g(&self.included),
            fallback_included: g(&self.fallback_included),
            excluded: g(&self.excluded),
        }
    }
}

impl RunStatsSnapshot {
    /// Push the run's counters into the process-wide recorder and log a summary.
    pub fn flush(&self) {
        counter!("freshness_items_total").increment(self.items);
        counter!("freshness_probes_total").increment(self.probes);
        counter!("freshness_cache_hits_total").increment(self.cache_hits);
        counter!("freshness_cache_misses_total").increment(self.cache_misses);
        counter!("freshness_cache_errors_total").increment(self.cache_errors);
        counter!("freshness_cache_writes_total").increment(self.cache_writes);
        for (method, n) in [
            ("metadata", self.by_metadata),
            ("url_pattern", self.by_url),
            ("rss_position", self.by_position),
            ("publishing_pattern", self.by_pattern),
            ("content_scan", self.by_content),
            ("failed", self.failed),
        ] {
            counter!("freshness_estimates_total", "method" => method).increment(n);
        }
        counter!("freshness_fetches_total").increment(self.fetches);
        counter!("freshness_fetch_failures_total").increment(self.fetch_failures);
        counter!("freshness_fetch_skipped_total").increment(self.fetch_skipped);
        counter!("freshness_included_total").increment(self.included);
        counter!("freshness_fallback_included_total").increment(self.fallback_included);
        counter!("freshness_excluded_total").increment(self.excluded);

        tracing::info!(
            target: "freshness",
            items = self.items,
            probes = self.probes,
            included = self.included,
            fallback_included = self.fallback_included,
            excluded = self.excluded,
            cache_hits = self.cache_hits,
            fetches = self.fetches,
            "freshness run finished"
        );
    }
}

/// Caps content-scan fetches per run: concurrency plus a total count.
#[derive(Debug)]
pub struct FetchBudget {
    permits: Semaphore,
    remaining: AtomicUsize,
}

impl FetchBudget {
    pub fn new(concurrency: usize, max_fetches: usize) -> Self {
        Self {
            permits: Semaphore::new(concurrency.max(1)),
            remaining: AtomicUsize::new(max_fetches),
        }
    }

    /// Reserve one fetch. `None` once the run's budget is spent.
    pub async fn acquire(&self) -> Option<SemaphorePermit<'_>> {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()?;
        self.permits.acquire().await.ok()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}

/// Bounded FIFO of fetched bodies keyed by URL. Failed fetches are cached as `None`.
#[derive(Debug)]
pub struct ResponseCache {
    inner: Mutex<ResponseInner>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct ResponseInner {
    order: VecDeque<String>,
    bodies: HashMap<String, Option<String>>,
}

impl ResponseCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(ResponseInner::default()),
            capacity,
        }
    }

    /// Outer `None` = never fetched; `Some(None)` = fetched and failed.
    pub fn get(&self, url: &str) -> Option<Option<String>> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.bodies.get(url).cloned()
    }

    pub fn insert(&self, url: &str, body: Option<String>) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.bodies.insert(url.to_string(), body).is_none() {
            inner.order.push_back(url.to_string());
        }
        while inner.order.len() > self.capacity {
            if let Some(old) = inner.order.pop_front() {
                inner.bodies.remove(&old);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bodies
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a single run shares across its workers.
#[derive(Debug)]
pub struct RunContext {
    pub stats: RunStats,
    pub fetch_budget: FetchBudget,
    pub responses: ResponseCache,
}

impl RunContext {
    pub fn new(fetch_concurrency: usize, max_fetches: usize, response_capacity: usize) -> Self {
        Self {
            stats: RunStats::default(),
            fetch_budget: FetchBudget::new(fetch_concurrency, max_fetches),
            responses: ResponseCache::with_capacity(response_capacity),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(3, 40, 64)
    }
}
