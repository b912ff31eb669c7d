use chrono::{DateTime, Utc};
use std::sync::Arc;

use shuttle_axum::axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::cache::SweepReport;
use crate::filter::BatchOutcome;
use crate::service::FreshnessService;
use crate::types::{CandidateItem, DateEstimate};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FreshnessService>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/freshness/filter", post(filter_batch))
        .route("/freshness/estimate", post(estimate_one))
        .route("/admin/cache/sweep", post(sweep_cache))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct FilterReq {
    items: Vec<CandidateItem>,
    /// Override the reference instant (replays, tests).
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

#[derive(serde::Deserialize)]
struct EstimateReq {
    #[serde(flatten)]
    item: CandidateItem,
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

async fn filter_batch(
    State(state): State<AppState>,
    Json(body): Json<FilterReq>,
) -> Json<BatchOutcome> {
    let now = body.now.unwrap_or_else(Utc::now);
    Json(state.service.run_batch(body.items, now).await)
}

async fn estimate_one(
    State(state): State<AppState>,
    Json(body): Json<EstimateReq>,
) -> Json<DateEstimate> {
    let now = body.now.unwrap_or_else(Utc::now);
    Json(state.service.estimate_one(&body.item, now).await)
}

async fn sweep_cache(State(state): State<AppState>) -> Json<SweepReport> {
    Json(state.service.sweep(Utc::now()).await)
}
