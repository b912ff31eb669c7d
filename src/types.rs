// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estimates at or below this confidence are never considered usable.
pub const VALIDITY_THRESHOLD: f32 = 0.3;

/// One feed entry awaiting freshness classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateItem {
    pub source_id: String, // e.g. "bloomberg_economics"
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// 0-based index within the source's feed, most recent first.
    #[serde(default)]
    pub feed_position: usize,
    #[serde(default)]
    pub feed_size: usize,
    #[serde(default)]
    pub metadata_timestamp: Option<DateTime<Utc>>,
}

/// Which step of the fallback chain produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateMethod {
    Metadata,
    Cache,
    UrlPattern,
    RssPosition,
    PublishingPattern,
    ContentScan,
    Failed,
}

impl EstimateMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateMethod::Metadata => "metadata",
            EstimateMethod::Cache => "cache",
            EstimateMethod::UrlPattern => "url_pattern",
            EstimateMethod::RssPosition => "rss_position",
            EstimateMethod::PublishingPattern => "publishing_pattern",
            EstimateMethod::ContentScan => "content_scan",
            EstimateMethod::Failed => "failed",
        }
    }
}

impl fmt::Display for EstimateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimateMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older records may carry the `_cached` suffix or the short `url` alias.
        let base = s.trim().trim_end_matches("_cached");
        Ok(match base {
            "metadata" => EstimateMethod::Metadata,
            "cache" => EstimateMethod::Cache,
            "url_pattern" | "url" => EstimateMethod::UrlPattern,
            "rss_position" => EstimateMethod::RssPosition,
            "publishing_pattern" => EstimateMethod::PublishingPattern,
            "content_scan" => EstimateMethod::ContentScan,
            "failed" => EstimateMethod::Failed,
            other => anyhow::bail!("unknown estimate method '{other}'"),
        })
    }
}

/// Outcome of one estimation attempt. Never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateEstimate {
    pub date: Option<DateTime<Utc>>,
    pub confidence: f32,
    pub method: EstimateMethod,
    /// Set when `method == Cache`: the method that originally produced the cached date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_from: Option<EstimateMethod>,
    pub details: String,
}

impl DateEstimate {
    pub fn new(
        date: DateTime<Utc>,
        confidence: f32,
        method: EstimateMethod,
        details: impl Into<String>,
    ) -> Self {
        Self {
            date: Some(date),
            confidence: confidence.clamp(0.0, 1.0),
            method,
            cached_from: None,
            details: details.into(),
        }
    }

    pub fn failed(details: impl Into<String>) -> Self {
        Self {
            date: None,
            confidence: 0.0,
            method: EstimateMethod::Failed,
            cached_from: None,
            details: details.into(),
        }
    }

    pub fn from_cache(
        date: DateTime<Utc>,
        confidence: f32,
        origin: EstimateMethod,
        details: impl Into<String>,
    ) -> Self {
        Self {
            date: Some(date),
            confidence: confidence.clamp(0.0, 1.0),
            method: EstimateMethod::Cache,
            cached_from: Some(origin),
            details: details.into(),
        }
    }

    /// `date` present and confidence strictly above the validity threshold.
    pub fn is_valid(&self) -> bool {
        self.date.is_some() && self.confidence > VALIDITY_THRESHOLD
    }

    /// Diagnostic label: `url_pattern`, `rss_position_cached`, ...
    pub fn label(&self) -> String {
        match (self.method, self.cached_from) {
            (EstimateMethod::Cache, Some(origin)) => format!("{origin}_cached"),
            (m, _) => m.as_str().to_string(),
        }
    }
}

/// Per-item output handed to downstream stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotatedItem {
    pub item: CandidateItem,
    pub estimate: DateEstimate,
    pub included: bool,
    /// Included by the trust-tier fallback despite having no usable date.
    #[serde(default)]
    pub fallback_included: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn validity_requires_date_and_threshold() {
        let d = Utc.with_ymd_and_hms(2025, 8, 25, 0, 0, 0).unwrap();
        assert!(DateEstimate::new(d, 0.31, EstimateMethod::UrlPattern, "").is_valid());
        assert!(!DateEstimate::new(d, 0.3, EstimateMethod::UrlPattern, "").is_valid());
        assert!(!DateEstimate::failed("nothing").is_valid());
    }

    #[test]
    fn cached_label_carries_origin() {
        let d = Utc.with_ymd_and_hms(2025, 8, 25, 0, 0, 0).unwrap();
        let e = DateEstimate::from_cache(d, 0.9, EstimateMethod::UrlPattern, "hit");
        assert_eq!(e.label(), "url_pattern_cached");
        assert_eq!(
            "rss_position_cached".parse::<EstimateMethod>().unwrap(),
            EstimateMethod::RssPosition
        );
        assert!("bogus".parse::<EstimateMethod>().is_err());
    }

    #[test]
    fn confidence_is_clamped() {
        let d = Utc.with_ymd_and_hms(2025, 8, 25, 0, 0, 0).unwrap();
        let e = DateEstimate::new(d, 1.7, EstimateMethod::ContentScan, "");
        assert!((e.confidence - 1.0).abs() < 1e-6);
    }
}
