// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::filter::FilterSettings;
use crate::inclusion::InclusionConfig;
use crate::policy::{PolicyOverride, SourcePolicies};

pub const ENV_CONFIG_PATH: &str = "FRESHNESS_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/freshness.toml";
pub const DEFAULT_JSON_PATH: &str = "config/freshness.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct FreshnessConfig {
    pub engine: EngineConfig,
    pub cache: CacheConfig,
    pub inclusion: InclusionConfig,
    /// Per-source policy overrides keyed by source id (or a substring of it).
    pub sources: HashMap<String, PolicyOverride>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub worker_pool_size: usize,
    pub fetch_concurrency: usize,
    pub max_fetches_per_run: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub response_cache_capacity: usize,
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 4,
            fetch_concurrency: 3,
            max_fetches_per_run: 40,
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            response_cache_capacity: 64,
            user_agent: concat!("news-freshness/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub memory_capacity: usize,
    /// Directory for the JSON file store. Unset = process-local store only.
    pub store_dir: Option<PathBuf>,
    pub retention_days: i64,
    pub confidence_floor: f32,
    /// Background sweep period; 0 disables the sweeper.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: 5_000,
            store_dir: None,
            retention_days: 30,
            confidence_floor: 0.3,
            sweep_interval_secs: 6 * 3600,
        }
    }
}

/// Ten years of cache retention at most.
pub const MAX_RETENTION_DAYS: i64 = 3_650;

impl FreshnessConfig {
    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            worker_pool_size: self.engine.worker_pool_size.max(1),
            fetch_concurrency: self.engine.fetch_concurrency.max(1),
            max_fetches_per_run: self.engine.max_fetches_per_run,
            response_cache_capacity: self.engine.response_cache_capacity,
        }
    }

    pub fn source_policies(&self) -> SourcePolicies {
        SourcePolicies::new(self.sources.clone())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.connect_timeout_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.request_timeout_secs.max(1))
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.cache.retention_days.clamp(1, MAX_RETENTION_DAYS))
    }
}

/// Load config from an explicit path. TOML or JSON, by extension then by content.
pub fn load_from(path: &Path) -> Result<FreshnessConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading freshness config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse(&content, ext.as_str())
        .with_context(|| format!("parsing freshness config {}", path.display()))?;
    tracing::info!(target: "config", path = %path.display(), sources = cfg.sources.len(), "freshness config loaded");
    Ok(cfg)
}

/// Load config using env var + fallbacks:
/// 1) $FRESHNESS_CONFIG_PATH
/// 2) config/freshness.toml
/// 3) config/freshness.json
/// 4) built-in defaults
pub fn load_default() -> Result<FreshnessConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from(DEFAULT_JSON_PATH);
    if json_p.exists() {
        return load_from(&json_p);
    }
    tracing::info!(target: "config", "no freshness config found; using defaults");
    Ok(FreshnessConfig::default())
}

fn parse(s: &str, hint_ext: &str) -> Result<FreshnessConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if s.trim_start().starts_with('{') {
                Ok(serde_json::from_str(s)?)
            } else {
                Ok(toml::from_str(s)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FilterMode, TrustTier};

    #[test]
    fn toml_sections_and_source_overrides() {
        let cfg = parse(
            r#"
            [engine]
            worker_pool_size = 8
            max_fetches_per_run = 10

            [cache]
            store_dir = "data/cache"
            retention_days = 7

            [inclusion]
            high = 0.5
            seed = 42

            [sources.yonhap]
            max_age_hours = 12
            trust_tier_for_fallback_inclusion = "high"
            filter_mode = "binary_search"
            "#,
            "toml",
        )
        .unwrap();
        assert_eq!(cfg.engine.worker_pool_size, 8);
        assert_eq!(cfg.engine.fetch_concurrency, 3);
        assert_eq!(cfg.cache.store_dir, Some(PathBuf::from("data/cache")));
        assert_eq!(cfg.inclusion.seed, Some(42));
        assert_eq!(cfg.inclusion.medium, 0.1);

        let y = &cfg.sources["yonhap"];
        assert_eq!(y.max_age_hours, Some(12));
        assert_eq!(y.trust_tier, Some(TrustTier::High));
        assert_eq!(y.filter_mode, Some(FilterMode::BinarySearch));
    }

    #[test]
    fn json_is_sniffed_without_extension() {
        let cfg = parse(r#"{"cache": {"memory_capacity": 3}}"#, "").unwrap();
        assert_eq!(cfg.cache.memory_capacity, 3);
        assert_eq!(cfg.engine, EngineConfig::default());
    }

    #[test]
    fn oversized_windows_are_clamped() {
        let cfg = parse(
            r#"
            [cache]
            retention_days = 9223372036854775807

            [sources.yonhap]
            max_age_hours = 9223372036854775807
            "#,
            "toml",
        )
        .unwrap();
        assert_eq!(cfg.retention(), chrono::Duration::days(MAX_RETENTION_DAYS));
        let p = cfg
            .source_policies()
            .resolve("yonhap", crate::policy::SourcePolicy::default());
        assert_eq!(p.max_age_hours, crate::policy::MAX_AGE_HOURS_LIMIT);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse("[engine\nbroken", "toml").is_err());
    }
}
