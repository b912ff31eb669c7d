// src/chain.rs
//! Per-item fallback chain: metadata → cache → routed estimator.
//! Valid estimator results are written back to the cache.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::cache::{short_hash, DateCache};
use crate::estimators::{DateEstimator, EstimateContext};
use crate::patterns::is_plausible;
use crate::policy::{SourcePolicies, SourcePolicy};
use crate::router::StrategyRouter;
use crate::run::RunContext;
use crate::types::{CandidateItem, DateEstimate, EstimateMethod};

/// Confidence given to a timestamp the feed itself supplied.
pub const METADATA_CONFIDENCE: f32 = 0.95;

pub struct FallbackChain {
    router: StrategyRouter,
    cache: Arc<DateCache>,
    policies: SourcePolicies,
}

impl FallbackChain {
    pub fn new(router: StrategyRouter, cache: Arc<DateCache>, policies: SourcePolicies) -> Self {
        Self {
            router,
            cache,
            policies,
        }
    }

    pub fn router(&self) -> &StrategyRouter {
        &self.router
    }

    pub fn cache(&self) -> &Arc<DateCache> {
        &self.cache
    }

    /// Estimator defaults with any configured override applied.
    pub fn policy_for(&self, source_id: &str) -> SourcePolicy {
        let estimator = self.router.route(source_id);
        self.policies
            .resolve(source_id, estimator.default_policy(source_id))
    }

    pub async fn estimate(
        &self,
        item: &CandidateItem,
        now: DateTime<Utc>,
        run: &RunContext,
    ) -> DateEstimate {
        let estimator = self.router.route(&item.source_id);
        let policy = self
            .policies
            .resolve(&item.source_id, estimator.default_policy(&item.source_id));
        self.estimate_with(item, estimator.as_ref(), &policy, now, run)
            .await
    }

    /// Same as [`estimate`](Self::estimate) with the estimator and policy already resolved.
    pub async fn estimate_with(
        &self,
        item: &CandidateItem,
        estimator: &dyn DateEstimator,
        policy: &SourcePolicy,
        now: DateTime<Utc>,
        run: &RunContext,
    ) -> DateEstimate {
        if let Some(ts) = item.metadata_timestamp {
            if is_plausible(ts, now) {
                run.stats.record_method(EstimateMethod::Metadata);
                return DateEstimate::new(
                    ts,
                    METADATA_CONFIDENCE,
                    EstimateMethod::Metadata,
                    "feed metadata timestamp",
                );
            }
            tracing::debug!(target: "freshness", key = %short_hash(&item.url), %ts, "ignoring implausible metadata timestamp");
        }

        if let Some(hit) = self.cache.lookup(&item.url, now, &run.stats).await {
            return hit;
        }

        let ctx = EstimateContext { now, policy, run };
        let estimate = estimator.estimate(item, &ctx).await;
        run.stats.record_method(estimate.method);

        if estimate.is_valid() {
            self.cache
                .record(&item.url, &item.source_id, &estimate, now, &run.stats)
                .await;
        }
        tracing::debug!(
            target: "freshness",
            source = %item.source_id,
            key = %short_hash(&item.url),
            estimator = estimator.name(),
            method = %estimate.label(),
            confidence = estimate.confidence,
            "estimated"
        );
        estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::estimators::UniversalEstimator;
    use crate::fetch::StaticFetcher;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap()
    }

    fn chain() -> FallbackChain {
        let universal = Arc::new(UniversalEstimator::new(
            Arc::new(StaticFetcher::new()),
            std::time::Duration::from_secs(1),
        ));
        FallbackChain::new(
            StrategyRouter::with_builtin(universal),
            Arc::new(DateCache::new(Arc::new(MemoryStore::new()), 64)),
            SourcePolicies::new(HashMap::new()),
        )
    }

    fn item(url: &str) -> CandidateItem {
        CandidateItem {
            source_id: "reuters_world".into(),
            url: url.into(),
            title: "Talks resume".into(),
            feed_position: 0,
            feed_size: 10,
            metadata_timestamp: None,
        }
    }

    #[tokio::test]
    async fn metadata_bypasses_cache_and_estimators() {
        let c = chain();
        let run = RunContext::default();
        let ts = now() - Duration::hours(3);
        let it = CandidateItem {
            metadata_timestamp: Some(ts),
            ..item("https://www.reuters.com/world/talks-2025-08-20/")
        };
        let e = c.estimate(&it, now(), &run).await;
        assert_eq!(e.method, EstimateMethod::Metadata);
        assert_eq!(e.date, Some(ts));
        assert_eq!(c.cache().memory_len().await, 0);
    }

    #[tokio::test]
    async fn second_estimate_is_served_from_cache() {
        let c = chain();
        let run = RunContext::default();
        let it = item("https://www.reuters.com/world/talks-2025-08-25/");
        let first = c.estimate(&it, now(), &run).await;
        assert_eq!(first.method, EstimateMethod::UrlPattern);

        let second = c.estimate(&it, now(), &run).await;
        assert_eq!(second.method, EstimateMethod::Cache);
        assert_eq!(second.label(), "url_pattern_cached");
        assert_eq!(second.date, first.date);
        assert_eq!(run.stats.snapshot().cache_hits, 1);
    }

    #[test]
    fn overrides_apply_on_top_of_estimator_defaults() {
        let mut o = HashMap::new();
        o.insert(
            "reuters".to_string(),
            crate::policy::PolicyOverride {
                max_age_hours: Some(6),
                ..Default::default()
            },
        );
        let universal = Arc::new(UniversalEstimator::new(
            Arc::new(StaticFetcher::new()),
            std::time::Duration::from_secs(1),
        ));
        let c = FallbackChain::new(
            StrategyRouter::with_builtin(universal),
            Arc::new(DateCache::new(Arc::new(MemoryStore::new()), 8)),
            SourcePolicies::new(o),
        );
        let p = c.policy_for("reuters_world");
        assert_eq!(p.max_age_hours, 6);
        assert_eq!(p.average_articles_per_day, 50.0);
    }
}
