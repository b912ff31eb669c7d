// tests/binary_search.rs
//
// On a recency-ordered feed the binary-search filter must keep exactly what the
// sequential filter keeps, while probing far fewer items.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use news_freshness::cache::{DateCache, MemoryStore};
use news_freshness::chain::FallbackChain;
use news_freshness::estimators::UniversalEstimator;
use news_freshness::fetch::StaticFetcher;
use news_freshness::filter::{FilterSettings, FreshnessFilter};
use news_freshness::inclusion::FallbackInclusion;
use news_freshness::policy::{FilterMode, SourcePolicies};
use news_freshness::router::StrategyRouter;
use news_freshness::types::CandidateItem;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap()
}

fn filter() -> FreshnessFilter {
    let universal = Arc::new(UniversalEstimator::new(
        Arc::new(StaticFetcher::new()),
        std::time::Duration::from_secs(1),
    ));
    let chain = FallbackChain::new(
        StrategyRouter::with_builtin(universal),
        Arc::new(DateCache::new(Arc::new(MemoryStore::new()), 1024)),
        SourcePolicies::new(HashMap::new()),
    );
    FreshnessFilter::new(
        Arc::new(chain),
        Arc::new(FallbackInclusion::exclude_all()),
        FilterSettings::default(),
    )
}

/// `fresh` items from today first, then items from August 20th or earlier.
fn ordered_feed(n: usize, fresh: usize) -> Vec<CandidateItem> {
    (0..n)
        .map(|i| {
            let day = if i < fresh {
                "2025-08-25".to_string()
            } else {
                // All outside the 48h window.
                format!("2025-{:02}-{:02}", 8 - (i / 28) as u32 % 7, 20 - (i % 19) as u32)
            };
            CandidateItem {
                source_id: "bloomberg".into(),
                url: format!("https://www.bloomberg.com/news/articles/{day}/item-{i}"),
                title: format!("Item {i}"),
                feed_position: i,
                feed_size: n,
                metadata_timestamp: None,
            }
        })
        .collect()
}

fn ceil_log2(n: usize) -> u64 {
    (usize::BITS - n.next_power_of_two().leading_zeros() - 1) as u64
}

#[tokio::test]
async fn binary_search_equals_sequential_on_ordered_feeds() {
    for n in [1usize, 2, 3, 7, 16, 33, 64] {
        for fresh in [0, 1, n / 2, n.saturating_sub(1), n] {
            let items = ordered_feed(n, fresh);

            let f = filter();
            let run = f.new_run();
            let seq: Vec<bool> = f
                .filter_source(&items, FilterMode::Sequential, now(), &run)
                .await
                .iter()
                .map(|a| a.included)
                .collect();

            let f = filter();
            let run = f.new_run();
            let bin: Vec<bool> = f
                .filter_source(&items, FilterMode::BinarySearch, now(), &run)
                .await
                .iter()
                .map(|a| a.included)
                .collect();

            assert_eq!(seq, bin, "n={n} fresh={fresh}");
            assert_eq!(bin.iter().filter(|k| **k).count(), fresh, "n={n} fresh={fresh}");

            let probes = run.stats.snapshot().probes;
            let bound = fresh as u64 + 2 + ceil_log2(n + 1);
            assert!(probes <= bound, "n={n} fresh={fresh} probes={probes} bound={bound}");
        }
    }
}

#[tokio::test]
async fn stale_feed_of_64_needs_about_log_n_probes() {
    let items = ordered_feed(64, 0);
    let f = filter();
    let run = f.new_run();
    let out = f
        .filter_source(&items, FilterMode::BinarySearch, now(), &run)
        .await;
    assert!(out.iter().all(|a| !a.included));
    assert!(run.stats.snapshot().probes <= 7);
}
