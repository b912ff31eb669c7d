//! # Confidence Model
//! Pure mapping `(method, weight, estimated date, now)` → score in `[0.0, 1.0]`.
//!
//! Each estimator carries its own base rates; the recency factor is shared.

use chrono::{DateTime, Duration, Utc};

use crate::types::EstimateMethod;

/// Per-method base rates. Estimators override these for their source's CMS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceModel {
    pub url_pattern: f32,
    pub rss_position: f32,
    pub publishing_pattern: f32,
    pub content_scan: f32,
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self {
            url_pattern: 0.85,
            rss_position: 0.65,
            publishing_pattern: 0.55,
            content_scan: 0.8,
        }
    }
}

impl ConfidenceModel {
    pub fn base_rate(&self, method: EstimateMethod) -> f32 {
        match method {
            EstimateMethod::UrlPattern => self.url_pattern,
            EstimateMethod::RssPosition => self.rss_position,
            EstimateMethod::PublishingPattern => self.publishing_pattern,
            EstimateMethod::ContentScan => self.content_scan,
            EstimateMethod::Metadata => 0.95,
            EstimateMethod::Cache | EstimateMethod::Failed => 0.0,
        }
    }

    /// `base_rate(method) * weight * recency_factor(date, now)`, clamped.
    pub fn score(
        &self,
        method: EstimateMethod,
        weight: f32,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> f32 {
        clamp01(self.base_rate(method) * weight * recency_factor(date, now))
    }
}

/// Penalize dates that cannot be right (future) or are suspiciously old.
pub fn recency_factor(date: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let age = now.signed_duration_since(date);
    if age < -Duration::days(1) {
        0.0
    } else if age < Duration::zero() {
        0.9
    } else if age <= Duration::days(7) {
        1.0
    } else if age <= Duration::days(365) {
        0.85
    } else {
        0.6
    }
}

fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
