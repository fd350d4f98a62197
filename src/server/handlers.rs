//! Request handlers

use super::error::Result;
use super::state::AppState;
use crate::inference::Recommendation;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub features: serde_json::Map<String, Value>,
}

pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<Recommendation>> {
    let recommendation = state.recommender.recommend(&req.features)?;
    info!(
        program = %recommendation.recommended_incentive_program,
        "recommendation served"
    );
    Ok(Json(recommendation))
}
