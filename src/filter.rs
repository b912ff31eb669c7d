// src/filter.rs
//! # Freshness Filter
//! Decides which candidate items are recent enough to keep.
//!
//! Items are grouped by source and each source batch runs on the worker pool.
//! Within a batch one of two modes applies (see [`FilterMode`]):
//!
//! - **Sequential**: every item is estimated. Sources routed to a content-scanning
//!   estimator evaluate up to `fetch_concurrency` items at once.
//! - **BinarySearch**: assumes recency-descending feed order, probes the middle of
//!   the remaining range, walks out from the first fresh probe, and skips the rest.
//!
//! An item with a valid dated estimate is included iff its date is after
//! `now - max_age_hours`. An undated item is decided by [`FallbackInclusion`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::chain::FallbackChain;
use crate::estimators::DateEstimator;
use crate::inclusion::FallbackInclusion;
use crate::policy::{FilterMode, SourcePolicy};
use crate::run::{RunContext, RunStatsSnapshot};
use crate::types::{AnnotatedItem, CandidateItem, DateEstimate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSettings {
    /// Source batches processed at once.
    pub worker_pool_size: usize,
    /// Parallel content-scan evaluations within one sequential batch.
    pub fetch_concurrency: usize,
    pub max_fetches_per_run: usize,
    pub response_cache_capacity: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            worker_pool_size: 4,
            fetch_concurrency: 3,
            max_fetches_per_run: 40,
            response_cache_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// One entry per input item, in input order.
    pub results: Vec<AnnotatedItem>,
    pub stats: RunStatsSnapshot,
}

impl BatchOutcome {
    pub fn included(&self) -> impl Iterator<Item = &AnnotatedItem> {
        self.results.iter().filter(|a| a.included)
    }
}

#[derive(Clone)]
pub struct FreshnessFilter {
    chain: Arc<FallbackChain>,
    inclusion: Arc<FallbackInclusion>,
    settings: FilterSettings,
}

impl FreshnessFilter {
    pub fn new(
        chain: Arc<FallbackChain>,
        inclusion: Arc<FallbackInclusion>,
        settings: FilterSettings,
    ) -> Self {
        Self {
            chain,
            inclusion,
            settings,
        }
    }

    pub fn chain(&self) -> &Arc<FallbackChain> {
        &self.chain
    }

    pub fn settings(&self) -> FilterSettings {
        self.settings
    }

    pub fn new_run(&self) -> Arc<RunContext> {
        Arc::new(RunContext::new(
            self.settings.fetch_concurrency,
            self.settings.max_fetches_per_run,
            self.settings.response_cache_capacity,
        ))
    }

    /// Filter a whole mixed-source batch. Each source uses its configured mode.
    pub async fn run(&self, items: Vec<CandidateItem>, now: DateTime<Utc>) -> BatchOutcome {
        let run = self.new_run();
        let total = items.len();

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, item) in items.iter().enumerate() {
            groups.entry(item.source_id.clone()).or_default().push(idx);
        }

        let workers = Arc::new(Semaphore::new(self.settings.worker_pool_size.max(1)));
        let mut handles = Vec::with_capacity(groups.len());
        for (source, mut idxs) in groups {
            idxs.sort_by_key(|&i| items[i].feed_position);
            let batch: Vec<CandidateItem> = idxs.iter().map(|&i| items[i].clone()).collect();
            let this = self.clone();
            let run = Arc::clone(&run);
            let workers = Arc::clone(&workers);
            let task_batch = batch.clone();
            let handle = tokio::spawn(async move {
                let _permit = workers.acquire_owned().await.ok();
                let mode = this.chain.policy_for(&source).filter_mode;
                this.filter_source(&task_batch, mode, now, &run).await
            });
            handles.push((idxs, batch, handle));
        }

        let mut slots: Vec<Option<AnnotatedItem>> = vec![None; total];
        for (idxs, batch, handle) in handles {
            let annotated = match handle.await {
                Ok(v) => v,
                Err(err) => {
                    tracing::error!(target: "freshness", error = %err, "source worker failed; excluding its items");
                    batch
                        .into_iter()
                        .map(|item| {
                            run.stats.record_decision(false, false);
                            excluded(item, DateEstimate::failed("worker failed"))
                        })
                        .collect()
                }
            };
            for (i, a) in idxs.into_iter().zip(annotated) {
                slots[i] = Some(a);
            }
        }

        let results = slots.into_iter().flatten().collect();
        BatchOutcome {
            results,
            stats: run.stats.snapshot(),
        }
    }

    /// Filter one source's items, already in feed order. Output is aligned with input.
    pub async fn filter_source(
        &self,
        items: &[CandidateItem],
        mode: FilterMode,
        now: DateTime<Utc>,
        run: &Arc<RunContext>,
    ) -> Vec<AnnotatedItem> {
        let Some(first) = items.first() else {
            return Vec::new();
        };
        for _ in items {
            run.stats.record_item();
        }
        let estimator = self.chain.router().route(&first.source_id);
        let policy = self.chain.policy_for(&first.source_id);
        tracing::debug!(
            target: "freshness",
            source = %first.source_id,
            estimator = estimator.name(),
            ?mode,
            items = items.len(),
            "filtering source batch"
        );
        match mode {
            FilterMode::Sequential => self.sequential(items, estimator, policy, now, run).await,
            FilterMode::BinarySearch => {
                self.binary_search(items, estimator.as_ref(), &policy, now, run)
                    .await
            }
        }
    }

    async fn evaluate(
        &self,
        item: &CandidateItem,
        estimator: &dyn DateEstimator,
        policy: &SourcePolicy,
        now: DateTime<Utc>,
        run: &RunContext,
    ) -> AnnotatedItem {
        run.stats.record_probe();
        let estimate = self
            .chain
            .estimate_with(item, estimator, policy, now, run)
            .await;
        self.decide(item.clone(), estimate, policy, now, run)
    }

    fn decide(
        &self,
        item: CandidateItem,
        estimate: DateEstimate,
        policy: &SourcePolicy,
        now: DateTime<Utc>,
        run: &RunContext,
    ) -> AnnotatedItem {
        let cutoff = now - Duration::hours(policy.max_age_hours);
        let (included, fallback_included) = match estimate.date {
            Some(date) if estimate.is_valid() => (date > cutoff, false),
            _ => {
                let keep = self.inclusion.should_include(policy.trust_tier);
                (keep, keep)
            }
        };
        run.stats.record_decision(included, fallback_included);
        AnnotatedItem {
            item,
            estimate,
            included,
            fallback_included,
        }
    }

    async fn sequential(
        &self,
        items: &[CandidateItem],
        estimator: Arc<dyn DateEstimator>,
        policy: SourcePolicy,
        now: DateTime<Utc>,
        run: &Arc<RunContext>,
    ) -> Vec<AnnotatedItem> {
        let parallel = if estimator.scans_content() {
            self.settings.fetch_concurrency.max(1)
        } else {
            1
        };
        if parallel == 1 {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(
                    self.evaluate(item, estimator.as_ref(), &policy, now, run)
                        .await,
                );
            }
            return out;
        }

        let policy = Arc::new(policy);
        let mut slots: Vec<Option<AnnotatedItem>> = vec![None; items.len()];
        let mut set = JoinSet::new();
        let mut next = 0;
        loop {
            while set.len() < parallel && next < items.len() {
                let this = self.clone();
                let item = items[next].clone();
                let estimator = Arc::clone(&estimator);
                let policy = Arc::clone(&policy);
                let run = Arc::clone(run);
                let idx = next;
                set.spawn(async move {
                    let a = this
                        .evaluate(&item, estimator.as_ref(), &policy, now, &run)
                        .await;
                    (idx, a)
                });
                next += 1;
            }
            match set.join_next().await {
                Some(Ok((idx, a))) => slots[idx] = Some(a),
                Some(Err(err)) => {
                    tracing::error!(target: "freshness", error = %err, "item evaluation failed");
                }
                None => break,
            }
        }

        slots
            .into_iter()
            .zip(items)
            .map(|(slot, item)| {
                slot.unwrap_or_else(|| {
                    run.stats.record_decision(false, false);
                    excluded(item.clone(), DateEstimate::failed("evaluation failed"))
                })
            })
            .collect()
    }

    async fn binary_search(
        &self,
        items: &[CandidateItem],
        estimator: &dyn DateEstimator,
        policy: &SourcePolicy,
        now: DateTime<Utc>,
        run: &RunContext,
    ) -> Vec<AnnotatedItem> {
        let n = items.len();
        let mut probed: Vec<Option<AnnotatedItem>> = vec![None; n];

        // Candidate range is [0, hi). Halve until a probe is fresh.
        let mut hi = n;
        while hi > 0 {
            let mid = (hi - 1) / 2;
            if !self
                .probe(mid, items, &mut probed, estimator, policy, now, run)
                .await
            {
                hi = mid;
                continue;
            }
            let mut lo = mid;
            while lo > 0
                && self
                    .probe(lo - 1, items, &mut probed, estimator, policy, now, run)
                    .await
            {
                lo -= 1;
            }
            let mut top = mid;
            while top + 1 < hi
                && self
                    .probe(top + 1, items, &mut probed, estimator, policy, now, run)
                    .await
            {
                top += 1;
            }
            tracing::debug!(target: "freshness", fresh_from = lo, fresh_to = top, "binary search settled");
            break;
        }

        probed
            .into_iter()
            .zip(items)
            .map(|(slot, item)| {
                slot.unwrap_or_else(|| {
                    run.stats.record_decision(false, false);
                    excluded(
                        item.clone(),
                        DateEstimate::failed("beyond freshness boundary"),
                    )
                })
            })
            .collect()
    }

    /// Evaluate `items[idx]` once; later calls reuse the decision.
    #[allow(clippy::too_many_arguments)]
    async fn probe(
        &self,
        idx: usize,
        items: &[CandidateItem],
        probed: &mut [Option<AnnotatedItem>],
        estimator: &dyn DateEstimator,
        policy: &SourcePolicy,
        now: DateTime<Utc>,
        run: &RunContext,
    ) -> bool {
        if let Some(a) = &probed[idx] {
            return a.included;
        }
        let a = self.evaluate(&items[idx], estimator, policy, now, run).await;
        let included = a.included;
        probed[idx] = Some(a);
        included
    }
}

fn excluded(item: CandidateItem, estimate: DateEstimate) -> AnnotatedItem {
    AnnotatedItem {
        item,
        estimate,
        included: false,
        fallback_included: false,
    }
}
