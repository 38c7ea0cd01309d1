//! Chart endpoints.

use anichart_common::AppResult;
use anichart_core::PeriodChart;
use anichart_db::entities::rank_snapshot::{self, MedalTier};
use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// One chart row.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRowResponse {
    pub rank: i32,
    pub content_item_id: String,
    pub episode_id: String,
    pub rank_delta: Option<i32>,
    pub consecutive_weeks_at_rank: i32,
    pub vote_percent: f64,
    pub bayes_score: f64,
    pub voter_count: i32,
    pub medal_tier: MedalTier,
}

impl From<rank_snapshot::Model> for ChartRowResponse {
    fn from(row: rank_snapshot::Model) -> Self {
        Self {
            rank: row.rank,
            content_item_id: row.content_item_id,
            episode_id: row.episode_id,
            rank_delta: row.rank_delta,
            consecutive_weeks_at_rank: row.consecutive_weeks_at_rank,
            vote_percent: row.vote_percent,
            bayes_score: row.bayes_score,
            voter_count: row.voter_count,
            medal_tier: row.medal_tier,
        }
    }
}

/// A published chart.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub period_id: String,
    pub start_at: String,
    pub end_at: String,
    pub closed_at: Option<String>,
    pub rows: Vec<ChartRowResponse>,
}

impl From<PeriodChart> for ChartResponse {
    fn from(chart: PeriodChart) -> Self {
        Self {
            period_id: chart.period.id,
            start_at: chart.period.start_at.to_rfc3339(),
            end_at: chart.period.end_at.to_rfc3339(),
            closed_at: chart.period.closed_at.map(|t| t.to_rfc3339()),
            rows: chart.rows.into_iter().map(Into::into).collect(),
        }
    }
}

/// Chart of the most recently closed period.
async fn latest(State(state): State<AppState>) -> AppResult<ApiResponse<ChartResponse>> {
    let chart = state.chart_service.latest_chart().await?;
    Ok(ApiResponse::ok(chart.into()))
}

/// Chart of a period.
async fn show(
    State(state): State<AppState>,
    Path(period_id): Path<String>,
) -> AppResult<ApiResponse<ChartResponse>> {
    let chart = state.chart_service.chart(&period_id).await?;
    Ok(ApiResponse::ok(chart.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/latest", get(latest))
        .route("/{period_id}", get(show))
}
