//! Content item endpoints.

use anichart_common::AppResult;
use anichart_core::RankHistory;
use anichart_db::entities::rank_snapshot::MedalTier;
use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Past placement of a title.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResponse {
    pub period_id: String,
    pub rank: i32,
    pub rank_delta: Option<i32>,
    pub medal_tier: MedalTier,
}

/// Rank history of a title.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankHistoryResponse {
    pub content_item_id: String,
    pub title: String,
    pub debut_rank: Option<i32>,
    pub debut_date: Option<String>,
    pub peak_rank: Option<i32>,
    pub peak_date: Option<String>,
    pub weeks_on_top: i32,
    pub recent: Vec<PlacementResponse>,
}

impl From<RankHistory> for RankHistoryResponse {
    fn from(history: RankHistory) -> Self {
        let content = history.content;
        Self {
            content_item_id: content.id,
            title: content.title,
            debut_rank: content.debut_rank,
            debut_date: content.debut_date.map(|d| d.to_string()),
            peak_rank: content.peak_rank,
            peak_date: content.peak_date.map(|d| d.to_string()),
            weeks_on_top: content.weeks_on_top,
            recent: history
                .recent
                .into_iter()
                .map(|row| PlacementResponse {
                    period_id: row.period_id,
                    rank: row.rank,
                    rank_delta: row.rank_delta,
                    medal_tier: row.medal_tier,
                })
                .collect(),
        }
    }
}

/// Debut, peak and recent placements of a title.
async fn history(
    State(state): State<AppState>,
    Path(content_item_id): Path<String>,
) -> AppResult<ApiResponse<RankHistoryResponse>> {
    let history = state.chart_service.rank_history(&content_item_id).await?;
    Ok(ApiResponse::ok(history.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/history", get(history))
}
