//! Admin endpoints for the weekly close and network suppression.

use anichart_common::AppResult;
use anichart_core::{RecomputedEpisode, SuppressionReport};
use axum::{
    Json, Router,
    extract::{Path, State},
    middleware::from_fn,
    routing::post,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    endpoints::charts::ChartResponse,
    middleware::{AppState, require_admin},
    response::ApiResponse,
};

/// Suppression request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuppressRequest {
    #[validate(length(min = 1, max = 128))]
    pub network: String,

    #[validate(length(max = 512))]
    pub reason: Option<String>,
}

/// Restore request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    #[validate(length(min = 1, max = 128))]
    pub network: String,
}

/// Run the weekly close for a period now.
async fn close(
    State(state): State<AppState>,
    Path(period_id): Path<String>,
) -> AppResult<ApiResponse<ChartResponse>> {
    let chart = state.chart_service.run_weekly_close(&period_id).await?;
    Ok(ApiResponse::ok(chart.into()))
}

/// Rebuild all aggregates of a period.
async fn recompute(
    State(state): State<AppState>,
    Path(period_id): Path<String>,
) -> AppResult<ApiResponse<Vec<RecomputedEpisode>>> {
    let episodes = state.chart_service.force_recompute(&period_id).await?;
    Ok(ApiResponse::ok(episodes))
}

/// Ban a network and suppress its submissions in a period.
async fn suppress(
    State(state): State<AppState>,
    Path(period_id): Path<String>,
    Json(req): Json<SuppressRequest>,
) -> AppResult<ApiResponse<SuppressionReport>> {
    req.validate()?;
    let report = state
        .chart_service
        .suppress_network(&period_id, &req.network, req.reason)
        .await?;
    Ok(ApiResponse::ok(report))
}

/// Lift a network ban and restore its submissions in a period.
async fn restore(
    State(state): State<AppState>,
    Path(period_id): Path<String>,
    Json(req): Json<RestoreRequest>,
) -> AppResult<ApiResponse<SuppressionReport>> {
    req.validate()?;
    let report = state
        .chart_service
        .restore_network(&period_id, &req.network)
        .await?;
    Ok(ApiResponse::ok(report))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/periods/{id}/close", post(close))
        .route("/periods/{id}/recompute", post(recompute))
        .route("/periods/{id}/suppress", post(suppress))
        .route("/periods/{id}/restore", post(restore))
        .route_layer(from_fn(require_admin))
}
