// src/cache/mod.rs
//! # Date Cache
//! Two-tier cache of the best-known estimate per URL.
//!
//! - Tier 1: bounded in-process map. When full, new entries are simply not admitted.
//! - Tier 2: a [`CacheStore`] keyed by the SHA-256 of the raw URL.
//!
//! Lookups go tier 1 → tier 2 (promoting hits) → miss. Writes only land when
//! there is no valid entry yet or the new confidence is strictly higher.
//! Store failures are logged and the tier is skipped; they never fail the caller.

pub mod store;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::run::RunStats;
use crate::types::{DateEstimate, EstimateMethod};
pub use store::{CacheEntry, CacheStore, JsonFileStore, MemoryStore};

/// SHA-256 of the raw URL, lowercase hex.
pub fn url_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Short hash prefix for logs; raw URLs are not logged.
pub(crate) fn short_hash(url: &str) -> String {
    url_hash(url).chars().take(12).collect()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub deleted: usize,
    pub invalidated: usize,
    pub memory_evicted: usize,
}

pub struct DateCache {
    memory: Mutex<HashMap<String, CacheEntry>>,
    capacity: usize,
    store: Arc<dyn CacheStore>,
}

impl DateCache {
    pub fn new(store: Arc<dyn CacheStore>, capacity: usize) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            capacity,
            store,
        }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub async fn memory_len(&self) -> usize {
        self.memory.lock().await.len()
    }

    /// Look up the cached estimate for `url`. A hit bumps `verification_count`
    /// and comes back as `method = Cache` with the original method recorded.
    pub async fn lookup(
        &self,
        url: &str,
        now: DateTime<Utc>,
        stats: &RunStats,
    ) -> Option<DateEstimate> {
        let key = url_hash(url);
        // The lock spans the store round-trip so the count bump is atomic per key.
        let mut memory = self.memory.lock().await;

        let mut entry = match memory.get(&key) {
            Some(e) if e.is_valid => e.clone(),
            _ => match self.store.get(&key).await {
                Ok(Some(e)) if e.is_valid => e,
                Ok(_) => {
                    stats.record_cache_miss();
                    return None;
                }
                Err(err) => {
                    stats.record_cache_error();
                    tracing::warn!(target: "date_cache", key = %short_hash(url), error = %err, "cache store read failed; skipping tier");
                    stats.record_cache_miss();
                    return None;
                }
            },
        };

        entry.verification_count = entry.verification_count.saturating_add(1);
        entry.last_verified_at = Some(now);

        if memory.contains_key(&key) || memory.len() < self.capacity {
            memory.insert(key.clone(), entry.clone());
        }
        if let Err(err) = self.store.put(&entry).await {
            stats.record_cache_error();
            tracing::warn!(target: "date_cache", key = %short_hash(url), error = %err, "cache store verification write failed");
        }
        drop(memory);

        stats.record_cache_hit();
        let origin = entry
            .method
            .parse::<EstimateMethod>()
            .unwrap_or(EstimateMethod::Cache);
        Some(DateEstimate::from_cache(
            entry.extracted_date,
            entry.confidence,
            origin,
            format!(
                "cached {} (verified {}x): {}",
                entry.method, entry.verification_count, entry.details
            ),
        ))
    }

    /// Persist `estimate` for `url` if it is valid and beats any existing valid entry.
    /// Returns `true` when something was written.
    pub async fn record(
        &self,
        url: &str,
        source_name: &str,
        estimate: &DateEstimate,
        now: DateTime<Utc>,
        stats: &RunStats,
    ) -> bool {
        if !estimate.is_valid() || estimate.method == EstimateMethod::Cache {
            return false;
        }
        let Some(date) = estimate.date else {
            return false;
        };
        let key = url_hash(url);
        let mut memory = self.memory.lock().await;

        let existing = match memory.get(&key) {
            Some(e) => Some(e.clone()),
            None => match self.store.get(&key).await {
                Ok(e) => e,
                Err(err) => {
                    stats.record_cache_error();
                    tracing::warn!(target: "date_cache", key = %short_hash(url), error = %err, "cache store read failed; skipping write");
                    return false;
                }
            },
        };

        let entry = match existing {
            Some(prev) if prev.is_valid && estimate.confidence <= prev.confidence => {
                return false;
            }
            Some(prev) => CacheEntry {
                url_hash: key.clone(),
                source_name: source_name.to_string(),
                extracted_date: date,
                method: estimate.method.as_str().to_string(),
                confidence: estimate.confidence,
                details: estimate.details.clone(),
                created_at: prev.created_at,
                last_verified_at: Some(now),
                verification_count: prev.verification_count.saturating_add(1),
                is_valid: true,
            },
            None => CacheEntry {
                url_hash: key.clone(),
                source_name: source_name.to_string(),
                extracted_date: date,
                method: estimate.method.as_str().to_string(),
                confidence: estimate.confidence,
                details: estimate.details.clone(),
                created_at: now,
                last_verified_at: None,
                verification_count: 0,
                is_valid: true,
            },
        };

        if let Err(err) = self.store.put(&entry).await {
            stats.record_cache_error();
            tracing::warn!(target: "date_cache", key = %short_hash(url), error = %err, "cache store write failed");
        }
        if memory.contains_key(&key) || memory.len() < self.capacity {
            memory.insert(key, entry);
        }
        stats.record_cache_write();
        true
    }

    /// Maintenance: drop entries created before `now - retention`, invalidate
    /// entries below `confidence_floor`. Idempotent.
    pub async fn sweep(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
        confidence_floor: f32,
    ) -> SweepReport {
        let horizon = now - retention;
        let mut report = SweepReport::default();

        match self.store.delete_older_than(horizon).await {
            Ok(n) => report.deleted = n,
            Err(err) => {
                tracing::warn!(target: "date_cache", error = %err, "cache retention sweep failed")
            }
        }
        match self.store.invalidate_below_confidence(confidence_floor).await {
            Ok(n) => report.invalidated = n,
            Err(err) => {
                tracing::warn!(target: "date_cache", error = %err, "cache confidence sweep failed")
            }
        }

        let mut memory = self.memory.lock().await;
        let before = memory.len();
        memory.retain(|_, e| e.created_at >= horizon);
        for e in memory.values_mut() {
            if e.is_valid && e.confidence < confidence_floor {
                e.is_valid = false;
            }
        }
        report.memory_evicted = before - memory.len();

        tracing::info!(
            target: "date_cache",
            deleted = report.deleted,
            invalidated = report.invalidated,
            memory_evicted = report.memory_evicted,
            store = self.store.name(),
            "cache sweep finished"
        );
        report
    }
}
