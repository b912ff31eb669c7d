//! # Source Policies
//!
//! Per-source tunables consumed by the estimators and the freshness filter.
//! Each estimator supplies defaults for the sources it supports; configured
//! overrides are layered on top.
//!
//! Override lookup mirrors how sources are routed: exact → substring → none.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How much we trust a source when we could not date one of its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

/// Which filter a source's batch goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Evaluate every item (no ordering assumption).
    #[default]
    Sequential,
    /// Probe by feed position, assuming recency-descending order.
    BinarySearch,
}

/// Resolved tunables for one source, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePolicy {
    pub max_age_hours: i64,
    /// Source-local hours (0–23) in which the source usually publishes.
    pub typical_publishing_hours: Vec<u32>,
    pub average_articles_per_day: f64,
    pub assumed_recent_article_count: usize,
    pub trust_tier: TrustTier,
    pub filter_mode: FilterMode,
}

/// Ten years; larger windows overflow chrono date arithmetic.
pub const MAX_AGE_HOURS_LIMIT: i64 = 24 * 365 * 10;

impl Default for SourcePolicy {
    fn default() -> Self {
        Self {
            max_age_hours: 48,
            typical_publishing_hours: Vec::new(),
            average_articles_per_day: 20.0,
            assumed_recent_article_count: 0,
            trust_tier: TrustTier::Unknown,
            filter_mode: FilterMode::Sequential,
        }
    }
}

impl SourcePolicy {
    pub fn apply(mut self, o: &PolicyOverride) -> Self {
        if let Some(v) = o.max_age_hours {
            self.max_age_hours = v.clamp(1, MAX_AGE_HOURS_LIMIT);
        }
        if let Some(v) = &o.typical_publishing_hours {
            self.typical_publishing_hours = v.iter().copied().filter(|h| *h < 24).collect();
        }
        if let Some(v) = o.average_articles_per_day {
            if v.is_finite() && v > 0.0 {
                self.average_articles_per_day = v;
            }
        }
        if let Some(v) = o.assumed_recent_article_count {
            self.assumed_recent_article_count = v;
        }
        if let Some(v) = o.trust_tier {
            self.trust_tier = v;
        }
        if let Some(v) = o.filter_mode {
            self.filter_mode = v;
        }
        self
    }
}

/// Partial policy as written in config; unset fields keep the estimator default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PolicyOverride {
    #[serde(default)]
    pub max_age_hours: Option<i64>,
    #[serde(default)]
    pub typical_publishing_hours: Option<Vec<u32>>,
    #[serde(default)]
    pub average_articles_per_day: Option<f64>,
    #[serde(default)]
    pub assumed_recent_article_count: Option<usize>,
    #[serde(default, alias = "trust_tier_for_fallback_inclusion")]
    pub trust_tier: Option<TrustTier>,
    #[serde(default)]
    pub filter_mode: Option<FilterMode>,
}

/// All configured overrides, keyed by normalized source id.
#[derive(Debug, Clone, Default)]
pub struct SourcePolicies {
    overrides: HashMap<String, PolicyOverride>,
}

impl SourcePolicies {
    pub fn new(overrides: HashMap<String, PolicyOverride>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(k, v)| (normalize_source_id(&k), v))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Self { overrides }
    }

    /// Find the override for `source_id`: exact key first, then the longest key
    /// contained in the id.
    pub fn override_for(&self, source_id: &str) -> Option<&PolicyOverride> {
        let s = normalize_source_id(source_id);
        if let Some(o) = self.overrides.get(&s) {
            return Some(o);
        }
        self.overrides
            .iter()
            .filter(|(k, _)| s.contains(k.as_str()))
            .max_by_key(|(k, _)| k.len())
            .map(|(_, o)| o)
    }

    /// Layer the configured override (if any) over the estimator defaults.
    pub fn resolve(&self, source_id: &str, defaults: SourcePolicy) -> SourcePolicy {
        match self.override_for(source_id) {
            Some(o) => defaults.apply(o),
            None => defaults,
        }
    }
}

/// Lowercase, trim and unify separators so `Bloomberg-Economics` == `bloomberg_economics`.
pub fn normalize_source_id(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();
    for ch in ['-', ' ', '.', '/'] {
        out = out.replace(ch, "_");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policies() -> SourcePolicies {
        let mut m = HashMap::new();
        m.insert(
            "bloomberg".to_string(),
            PolicyOverride {
                max_age_hours: Some(36),
                ..Default::default()
            },
        );
        m.insert(
            "Bloomberg-Economics".to_string(),
            PolicyOverride {
                trust_tier: Some(TrustTier::High),
                filter_mode: Some(FilterMode::BinarySearch),
                ..Default::default()
            },
        );
        SourcePolicies::new(m)
    }

    #[test]
    fn exact_match_beats_substring() {
        let p = policies().resolve("bloomberg_economics", SourcePolicy::default());
        assert_eq!(p.trust_tier, TrustTier::High);
        assert_eq!(p.filter_mode, FilterMode::BinarySearch);
        // Exact override leaves max age at the default.
        assert_eq!(p.max_age_hours, 48);
    }

    #[test]
    fn substring_fallback_and_defaults() {
        let p = policies().resolve("bloomberg_markets", SourcePolicy::default());
        assert_eq!(p.max_age_hours, 36);
        let u = policies().resolve("unknown_blog", SourcePolicy::default());
        assert_eq!(u, SourcePolicy::default());
    }

    #[test]
    fn override_sanitizes_values() {
        let o = PolicyOverride {
            max_age_hours: Some(0),
            typical_publishing_hours: Some(vec![9, 25, 13]),
            average_articles_per_day: Some(-3.0),
            ..Default::default()
        };
        let p = SourcePolicy::default().apply(&o);
        assert_eq!(p.max_age_hours, 1);
        assert_eq!(p.typical_publishing_hours, vec![9, 13]);
        assert_eq!(p.average_articles_per_day, 20.0);

        let huge = PolicyOverride {
            max_age_hours: Some(i64::MAX),
            ..Default::default()
        };
        let p = SourcePolicy::default().apply(&huge);
        assert_eq!(p.max_age_hours, MAX_AGE_HOURS_LIMIT);
    }

    #[test]
    fn source_ids_are_normalized() {
        assert_eq!(normalize_source_id(" Bloomberg-Economics "), "bloomberg_economics");
        assert_eq!(normalize_source_id("hankyung.com"), "hankyung_com");
    }
}
