// src/router.rs
use std::sync::Arc;

use crate::estimators::{profiles, DateEstimator, ProfileEstimator};
use crate::policy::normalize_source_id;

/// Picks the estimator for a source id: exact profile name, then the first
/// specialized estimator claiming it, then the universal one.
#[derive(Clone)]
pub struct StrategyRouter {
    specialized: Vec<Arc<dyn DateEstimator>>,
    universal: Arc<dyn DateEstimator>,
}

impl StrategyRouter {
    pub fn new(specialized: Vec<Arc<dyn DateEstimator>>, universal: Arc<dyn DateEstimator>) -> Self {
        Self {
            specialized,
            universal,
        }
    }

    /// Registry with every built-in profile.
    pub fn with_builtin(universal: Arc<dyn DateEstimator>) -> Self {
        let specialized = profiles::specialized()
            .into_iter()
            .map(|p| Arc::new(ProfileEstimator::new(p)) as Arc<dyn DateEstimator>)
            .collect();
        Self::new(specialized, universal)
    }

    pub fn route(&self, source_id: &str) -> Arc<dyn DateEstimator> {
        let normalized = normalize_source_id(source_id);
        let chosen = self
            .specialized
            .iter()
            .find(|e| e.name() == normalized)
            .or_else(|| self.specialized.iter().find(|e| e.supports(source_id)))
            .unwrap_or(&self.universal);
        tracing::trace!(target: "freshness", source = source_id, estimator = chosen.name(), "routed");
        Arc::clone(chosen)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.specialized
            .iter()
            .chain(std::iter::once(&self.universal))
            .map(|e| e.name())
            .collect()
    }
}
