// src/estimators/universal.rs
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::content::scrape_published_date;
use super::{profiles, DateEstimator, EstimateContext, SourceProfile};
use crate::cache::short_hash;
use crate::fetch::PageFetcher;
use crate::policy::{normalize_source_id, SourcePolicy};
use crate::types::{CandidateItem, DateEstimate, EstimateMethod};

/// Fallback estimator for any source: generic URL families plus a content scan.
pub struct UniversalEstimator {
    profile: SourceProfile,
    fetcher: Arc<dyn PageFetcher>,
    request_timeout: Duration,
    /// Specialized profiles consulted only for request headers and UTC offset.
    known: Vec<SourceProfile>,
}

impl UniversalEstimator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, request_timeout: Duration) -> Self {
        Self {
            profile: profiles::universal(),
            fetcher,
            request_timeout,
            known: profiles::specialized(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn profile_for(&self, source_id: &str) -> Option<&SourceProfile> {
        self.known.iter().find(|p| p.matches(source_id))
    }

    /// Source-aware headers: known-source hints, Korean hosts, same-origin referer.
    pub fn headers_for(&self, item: &CandidateItem) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = match self.profile_for(&item.source_id) {
            Some(p) => p
                .request_headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            None => Vec::new(),
        };
        let host = host_of(&item.url);
        if !headers.iter().any(|(k, _)| k == "Accept-Language") {
            let lang = if is_korean_outlet(item) {
                "ko-KR,ko;q=0.9,en;q=0.5"
            } else {
                "en-US,en;q=0.9"
            };
            headers.push(("Accept-Language".into(), lang.into()));
        }
        if let (Some(host), Some((scheme, _))) = (host, item.url.split_once("://")) {
            headers.push(("Referer".into(), format!("{scheme}://{host}/")));
        }
        headers
    }

    /// Wall-clock offset for dates read off the page.
    pub fn utc_offset_for(&self, item: &CandidateItem) -> i32 {
        match self.profile_for(&item.source_id) {
            Some(p) => p.utc_offset_hours,
            None if is_korean_outlet(item) => KST_OFFSET_HOURS,
            None => self.profile.utc_offset_hours,
        }
    }

    /// Body for `item.url`, at most one network attempt per URL per run.
    async fn page(&self, item: &CandidateItem, ctx: &EstimateContext<'_>) -> Result<String, &'static str> {
        if let Some(cached) = ctx.run.responses.get(&item.url) {
            return cached.ok_or("content fetch failed earlier in this run");
        }
        let Some(_permit) = ctx.run.fetch_budget.acquire().await else {
            ctx.run.stats.record_fetch_skipped();
            return Err("fetch budget exhausted for this run");
        };
        let headers = self.headers_for(item);
        let fetched = tokio::time::timeout(
            self.request_timeout,
            self.fetcher.fetch(&item.url, self.request_timeout, &headers),
        )
        .await
        .unwrap_or_else(|_| {
            tracing::debug!(target: "content_scan", key = %short_hash(&item.url), "page fetch timed out");
            None
        });
        ctx.run.stats.record_fetch(fetched.is_some());
        ctx.run.responses.insert(&item.url, fetched.clone());
        fetched.ok_or("content fetch failed")
    }
}

const KST_OFFSET_HOURS: i32 = 9;

/// `.kr` host or a `_kr` source id.
fn is_korean_outlet(item: &CandidateItem) -> bool {
    host_of(&item.url).map(|h| h.ends_with(".kr")).unwrap_or(false)
        || normalize_source_id(&item.source_id).ends_with("_kr")
}

fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://")?.1;
    let end = rest.find(|c: char| c == '/' || c == '?' || c == '#').unwrap_or(rest.len());
    let host = &rest[..end];
    (!host.is_empty()).then_some(host)
}

#[async_trait]
impl DateEstimator for UniversalEstimator {
    fn name(&self) -> &'static str {
        self.profile.name
    }

    fn supports(&self, _source_id: &str) -> bool {
        true
    }

    fn default_policy(&self, _source_id: &str) -> SourcePolicy {
        self.profile.defaults.clone()
    }

    fn from_url(&self, item: &CandidateItem, ctx: &EstimateContext<'_>) -> DateEstimate {
        self.profile.url_estimate(item, ctx)
    }

    fn from_feed_position(&self, item: &CandidateItem, ctx: &EstimateContext<'_>) -> DateEstimate {
        self.profile.position_estimate(item, ctx)
    }

    fn from_publishing_pattern(
        &self,
        item: &CandidateItem,
        ctx: &EstimateContext<'_>,
    ) -> DateEstimate {
        self.profile.pattern_estimate(item, ctx)
    }

    async fn from_content(&self, item: &CandidateItem, ctx: &EstimateContext<'_>) -> DateEstimate {
        let html = match self.page(item, ctx).await {
            Ok(html) => html,
            Err(why) => return DateEstimate::failed(why),
        };
        let offset = self.utc_offset_for(item);
        match scrape_published_date(&html, offset, ctx.now) {
            Some(found) => {
                let conf = self.profile.confidence.score(
                    EstimateMethod::ContentScan,
                    found.weight(),
                    found.date,
                    ctx.now,
                );
                DateEstimate::new(
                    found.date,
                    conf,
                    EstimateMethod::ContentScan,
                    format!("universal: {}", found.describe()),
                )
            }
            None => DateEstimate::failed("no date found in page content"),
        }
    }

    fn scans_content(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;
    use crate::run::RunContext;
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap()
    }

    fn item(source: &str, url: &str) -> CandidateItem {
        CandidateItem {
            source_id: source.into(),
            url: url.into(),
            title: "Quarterly results".into(),
            feed_position: 3,
            feed_size: 10,
            metadata_timestamp: None,
        }
    }

    #[tokio::test]
    async fn content_scan_uses_source_offset() {
        let url = "https://news.example.co.kr/view/abc";
        let fetcher = Arc::new(
            StaticFetcher::new().with_page(url, "<body><p>입력 2025.08.25 09:15</p></body>"),
        );
        let est = UniversalEstimator::new(fetcher.clone(), Duration::from_secs(5));
        let policy = est.default_policy("korean_daily_kr");
        let run = RunContext::default();
        let ctx = EstimateContext {
            now: now(),
            policy: &policy,
            run: &run,
        };
        let e = est.estimate(&item("korean_daily_kr", url), &ctx).await;
        assert_eq!(e.method, EstimateMethod::ContentScan);
        assert_eq!(e.date, Some(Utc.with_ymd_and_hms(2025, 8, 25, 0, 15, 0).unwrap()));

        let calls = fetcher.calls.lock().unwrap();
        let headers = &calls[0].1;
        assert!(headers.iter().any(|(k, v)| k == "Accept-Language" && v.starts_with("ko-KR")));
        assert!(headers
            .iter()
            .any(|(k, v)| k == "Referer" && v == "https://news.example.co.kr/"));
    }

    #[tokio::test]
    async fn one_fetch_per_url_per_run() {
        let fetcher = Arc::new(StaticFetcher::new());
        let est = UniversalEstimator::new(fetcher.clone(), Duration::from_secs(5));
        let policy = est.default_policy("x");
        let run = RunContext::default();
        let ctx = EstimateContext {
            now: now(),
            policy: &policy,
            run: &run,
        };
        let it = item("unknown_blog", "https://blog.test/post");
        assert_eq!(est.from_content(&it, &ctx).await.method, EstimateMethod::Failed);
        assert_eq!(est.from_content(&it, &ctx).await.method, EstimateMethod::Failed);
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(run.stats.snapshot().fetch_failures, 1);
    }

    #[tokio::test]
    async fn budget_exhaustion_skips_fetch() {
        let fetcher = Arc::new(StaticFetcher::new());
        let est = UniversalEstimator::new(fetcher.clone(), Duration::from_secs(5));
        let policy = est.default_policy("x");
        let run = RunContext::new(1, 0, 8);
        let ctx = EstimateContext {
            now: now(),
            policy: &policy,
            run: &run,
        };
        let e = est.from_content(&item("x", "https://a.test/1"), &ctx).await;
        assert!(e.details.contains("budget"));
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(run.stats.snapshot().fetch_skipped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out() {
        let url = "https://slow.test/a";
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(url, r#"<meta name="date" content="2025-08-25">"#)
                .with_delay(Duration::from_secs(30)),
        );
        let est = UniversalEstimator::new(fetcher, Duration::from_secs(2));
        let policy = est.default_policy("x");
        let run = RunContext::default();
        let ctx = EstimateContext {
            now: now(),
            policy: &policy,
            run: &run,
        };
        let e = est.from_content(&item("x", url), &ctx).await;
        assert_eq!(e.method, EstimateMethod::Failed);
    }

    #[test]
    fn unknown_korean_host_reads_kst() {
        let est = UniversalEstimator::new(Arc::new(StaticFetcher::new()), Duration::from_secs(1));
        assert_eq!(est.utc_offset_for(&item("gangwon_ilbo", "https://www.kwnews.example.kr/a")), 9);
        assert_eq!(est.utc_offset_for(&item("local_paper_kr", "https://paper.test/a")), 9);
        assert_eq!(est.utc_offset_for(&item("bloomberg_tech", "https://www.bloomberg.com/a")), -5);
        assert_eq!(est.utc_offset_for(&item("unknown_blog", "https://blog.test/a")), 0);
    }

    #[test]
    fn known_source_headers() {
        let est = UniversalEstimator::new(Arc::new(StaticFetcher::new()), Duration::from_secs(1));
        let h = est.headers_for(&item("bloomberg_tech", "https://www.bloomberg.com/a"));
        assert!(h.contains(&("Accept-Language".into(), "en-US,en;q=0.9".into())));
        assert_eq!(host_of("https://www.bloomberg.com?x=1"), Some("www.bloomberg.com"));
        assert_eq!(host_of("not a url"), None);
    }
}
