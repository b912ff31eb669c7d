// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod chain;
pub mod confidence;
pub mod config;
pub mod estimators;
pub mod fetch;
pub mod filter;
pub mod inclusion;
pub mod metrics;
pub mod patterns;
pub mod policy;
pub mod router;
pub mod run;
pub mod service;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::cache::{CacheEntry, CacheStore, DateCache, JsonFileStore, MemoryStore};
pub use crate::chain::FallbackChain;
pub use crate::config::FreshnessConfig;
pub use crate::estimators::{DateEstimator, UniversalEstimator};
pub use crate::fetch::{PageFetcher, ReqwestFetcher, StaticFetcher};
pub use crate::filter::{BatchOutcome, FilterSettings, FreshnessFilter};
pub use crate::inclusion::{FallbackInclusion, InclusionConfig};
pub use crate::policy::{FilterMode, SourcePolicy, TrustTier};
pub use crate::router::StrategyRouter;
pub use crate::service::FreshnessService;
pub use crate::types::{AnnotatedItem, CandidateItem, DateEstimate, EstimateMethod};
