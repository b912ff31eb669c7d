// src/estimators/mod.rs
//! Date estimators: one contract, parameterized per source.
//!
//! A specialized estimator differs from another only in its [`SourceProfile`]
//! (URL families, position buckets, base rates, keyword signals, defaults).
//! The universal estimator adds a content scan on top of a generic profile.

pub mod content;
pub mod profiles;
pub mod universal;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};

use crate::confidence::ConfidenceModel;
use crate::patterns::{date_from_url, UrlPattern};
use crate::policy::{normalize_source_id, SourcePolicy};
use crate::run::RunContext;
use crate::types::{CandidateItem, DateEstimate, EstimateMethod};

pub use universal::UniversalEstimator;

/// What every step sees besides the item itself.
pub struct EstimateContext<'a> {
    pub now: DateTime<Utc>,
    pub policy: &'a SourcePolicy,
    pub run: &'a RunContext,
}

/// Strategy contract shared by all estimators.
#[async_trait]
pub trait DateEstimator: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, source_id: &str) -> bool;

    fn max_age_hours(&self, source_id: &str) -> i64 {
        self.default_policy(source_id).max_age_hours
    }

    /// Tunables used when config has no override for the source.
    fn default_policy(&self, source_id: &str) -> SourcePolicy;

    fn from_url(&self, item: &CandidateItem, ctx: &EstimateContext<'_>) -> DateEstimate;

    fn from_feed_position(&self, item: &CandidateItem, ctx: &EstimateContext<'_>) -> DateEstimate;

    fn from_publishing_pattern(
        &self,
        item: &CandidateItem,
        ctx: &EstimateContext<'_>,
    ) -> DateEstimate;

    async fn from_content(&self, _item: &CandidateItem, _ctx: &EstimateContext<'_>) -> DateEstimate {
        DateEstimate::failed("content scan not available")
    }

    /// Whether `from_content` performs network fetches.
    fn scans_content(&self) -> bool {
        false
    }

    /// URL → feed position → publishing pattern → content; first valid result wins.
    async fn estimate(&self, item: &CandidateItem, ctx: &EstimateContext<'_>) -> DateEstimate {
        let url = self.from_url(item, ctx);
        if url.is_valid() {
            return url;
        }
        let position = self.from_feed_position(item, ctx);
        if position.is_valid() {
            return position;
        }
        let pattern = self.from_publishing_pattern(item, ctx);
        if pattern.is_valid() {
            return pattern;
        }
        let content = self.from_content(item, ctx).await;
        if content.is_valid() {
            return content;
        }
        DateEstimate::failed(format!(
            "exhausted: url: {}; position: {}; pattern: {}; content: {}",
            url.details, position.details, pattern.details, content.details
        ))
    }
}

/// Age assumed for items up to (excluding) `until` in feed order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionBucket {
    pub until: usize,
    pub age_minutes: i64,
    pub weight: f32,
}

impl PositionBucket {
    pub const fn new(until: usize, age_minutes: i64, weight: f32) -> Self {
        Self {
            until,
            age_minutes,
            weight,
        }
    }
}

/// Title keyword that places an item at a known typical age.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordSignal {
    pub keyword: &'static str,
    pub age_minutes: i64,
    pub weight: f32,
}

impl KeywordSignal {
    pub const fn new(keyword: &'static str, age_minutes: i64, weight: f32) -> Self {
        Self {
            keyword,
            age_minutes,
            weight,
        }
    }
}

/// Every source-specific parameter of the estimation chain.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub name: &'static str,
    /// Substrings of the normalized source id this profile claims.
    pub matchers: Vec<&'static str>,
    pub url_patterns: Vec<UrlPattern>,
    pub buckets: Vec<PositionBucket>,
    /// Weight for positions past the last bucket (cadence-based age).
    pub beyond_weight: f32,
    pub confidence: ConfidenceModel,
    pub keywords: Vec<KeywordSignal>,
    pub defaults: SourcePolicy,
    pub utc_offset_hours: i32,
    pub request_headers: Vec<(&'static str, &'static str)>,
}

impl SourceProfile {
    pub fn matches(&self, source_id: &str) -> bool {
        let s = normalize_source_id(source_id);
        s == self.name || self.matchers.iter().any(|m| s.contains(m))
    }

    pub fn url_estimate(&self, item: &CandidateItem, ctx: &EstimateContext<'_>) -> DateEstimate {
        match date_from_url(&item.url, &self.url_patterns, self.utc_offset_hours, ctx.now) {
            Some(hit) => {
                let conf =
                    self.confidence
                        .score(EstimateMethod::UrlPattern, hit.weight, hit.date, ctx.now);
                DateEstimate::new(
                    hit.date,
                    conf,
                    EstimateMethod::UrlPattern,
                    format!("{}: url {}", self.name, hit.family.as_str()),
                )
            }
            None => DateEstimate::failed("no url date pattern matched"),
        }
    }

    pub fn position_estimate(
        &self,
        item: &CandidateItem,
        ctx: &EstimateContext<'_>,
    ) -> DateEstimate {
        let policy = ctx.policy;
        let pos = item.feed_position;
        if pos >= policy.assumed_recent_article_count {
            return DateEstimate::failed(format!(
                "position {pos} outside assumed recent window ({})",
                policy.assumed_recent_article_count
            ));
        }
        if item.feed_size > 0 && pos >= item.feed_size {
            return DateEstimate::failed(format!(
                "position {pos} outside feed of {}",
                item.feed_size
            ));
        }

        let (age_minutes, weight, how) = match self.buckets.iter().find(|b| pos < b.until) {
            Some(b) => (b.age_minutes, b.weight, "bucket"),
            None => {
                let minutes = (pos as f64 + 1.0) * minutes_per_article(policy);
                let cap = policy.max_age_hours.saturating_mul(60);
                ((minutes as i64).min(cap), self.beyond_weight, "cadence")
            }
        };
        let date = ctx.now - Duration::minutes(age_minutes);
        let conf = self
            .confidence
            .score(EstimateMethod::RssPosition, weight, date, ctx.now);
        DateEstimate::new(
            date,
            conf,
            EstimateMethod::RssPosition,
            format!(
                "{}: feed position {pos}/{} ~{age_minutes}m old ({how})",
                self.name, item.feed_size
            ),
        )
    }

    pub fn pattern_estimate(
        &self,
        item: &CandidateItem,
        ctx: &EstimateContext<'_>,
    ) -> DateEstimate {
        let title = item.title.to_lowercase();
        if let Some(sig) = self.keywords.iter().find(|k| title.contains(k.keyword)) {
            let date = ctx.now - Duration::minutes(sig.age_minutes);
            let conf = self.confidence.score(
                EstimateMethod::PublishingPattern,
                sig.weight,
                date,
                ctx.now,
            );
            return DateEstimate::new(
                date,
                conf,
                EstimateMethod::PublishingPattern,
                format!("{}: keyword '{}'", self.name, sig.keyword),
            );
        }

        let hours = &ctx.policy.typical_publishing_hours;
        if hours.is_empty() {
            return DateEstimate::failed("no keyword signal and no publishing hours");
        }
        let local_hour = (ctx.now + Duration::hours(self.utc_offset_hours as i64)).hour();

        let (age_minutes, weight, how) = if hours.contains(&local_hour) {
            let cap = (ctx.policy.max_age_hours.saturating_mul(60) / 2).max(5);
            let minutes = (item.feed_position as f64 + 1.0) * minutes_per_article(ctx.policy);
            ((minutes as i64).clamp(5, cap), 0.75, "inside publishing window")
        } else {
            let back = (1..=24u32)
                .find(|k| hours.contains(&((local_hour + 24 - k) % 24)))
                .unwrap_or(24);
            (i64::from(back) * 60, 0.6, "after publishing window")
        };
        let date = ctx.now - Duration::minutes(age_minutes);
        let conf = self
            .confidence
            .score(EstimateMethod::PublishingPattern, weight, date, ctx.now);
        DateEstimate::new(
            date,
            conf,
            EstimateMethod::PublishingPattern,
            format!("{}: {how} (local hour {local_hour})", self.name),
        )
    }
}

fn minutes_per_article(policy: &SourcePolicy) -> f64 {
    (24.0 * 60.0 / policy.average_articles_per_day.max(0.01)).max(1.0)
}

/// Estimator fully described by its profile; no network access.
#[derive(Debug, Clone)]
pub struct ProfileEstimator {
    profile: SourceProfile,
}

impl ProfileEstimator {
    pub fn new(profile: SourceProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &SourceProfile {
        &self.profile
    }
}

#[async_trait]
impl DateEstimator for ProfileEstimator {
    fn name(&self) -> &'static str {
        self.profile.name
    }

    fn supports(&self, source_id: &str) -> bool {
        self.profile.matches(source_id)
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
}
