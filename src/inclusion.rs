// src/inclusion.rs
//! Last-resort inclusion for items the fallback chain could not date.
//!
//! Higher-trust sources get a small chance of inclusion despite no evidence;
//! low-trust and unknown sources are excluded. The RNG seed is injectable so
//! runs can be replayed exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::sync::{Mutex, PoisonError};

use crate::policy::TrustTier;

/// Inclusion probability per trust tier, plus an optional fixed seed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InclusionConfig {
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub unknown: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_high() -> f64 {
    0.3
}

fn default_medium() -> f64 {
    0.1
}

impl Default for InclusionConfig {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
            low: 0.0,
            unknown: 0.0,
            seed: None,
        }
    }
}

impl InclusionConfig {
    pub fn probability(&self, tier: TrustTier) -> f64 {
        let p = match tier {
            TrustTier::High => self.high,
            TrustTier::Medium => self.medium,
            TrustTier::Low => self.low,
            TrustTier::Unknown => self.unknown,
        };
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

pub struct FallbackInclusion {
    config: InclusionConfig,
    rng: Mutex<StdRng>,
}

impl FallbackInclusion {
    pub fn new(config: InclusionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Deterministic policy that never includes undated items.
    pub fn exclude_all() -> Self {
        Self::new(InclusionConfig {
            high: 0.0,
            medium: 0.0,
            low: 0.0,
            unknown: 0.0,
            seed: Some(0),
        })
    }

    pub fn config(&self) -> &InclusionConfig {
        &self.config
    }

    /// Draw once for an undated item. Probability 0 never draws; 1 always includes.
    pub fn should_include(&self, tier: TrustTier) -> bool {
        let p = self.config.probability(tier);
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random::<f64>() < p
    }
}
