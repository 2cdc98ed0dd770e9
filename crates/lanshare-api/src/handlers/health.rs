use std::sync::Arc;

use axum::{extract::State, Json};
use lanshare_core::HealthResponse;

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        files: state.registry.len().await,
    })
}
