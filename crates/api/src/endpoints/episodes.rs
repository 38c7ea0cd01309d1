//! Episode and voting endpoints.

use anichart_common::AppResult;
use anichart_core::{CastVoteInput, EpisodeStatus, VoteReceipt, VoteState};
use anichart_db::entities::star_vote;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::CurrentVoter, middleware::AppState, response::ApiResponse};

/// Episode status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeResponse {
    pub id: String,
    pub content_item_id: String,
    pub number: i32,
    pub aired_at: String,
    pub is_break: bool,
    pub state: VoteState,
    pub voter_count: u32,
    pub histogram: [u32; 10],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

impl From<EpisodeStatus> for EpisodeResponse {
    fn from(status: EpisodeStatus) -> Self {
        Self {
            id: status.episode.id,
            content_item_id: status.episode.content_item_id,
            number: status.episode.number,
            aired_at: status.episode.aired_at.to_rfc3339(),
            is_break: status.episode.is_break,
            state: status.state,
            voter_count: status.aggregate.voter_count,
            histogram: status.aggregate.histogram,
            mean: status.mean,
        }
    }
}

/// Vote response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub vote_id: String,
    pub episode_id: String,
    pub score: Option<i32>,
    pub late_participation: bool,
    pub voter_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

impl From<VoteReceipt> for VoteResponse {
    fn from(receipt: VoteReceipt) -> Self {
        Self {
            mean: receipt.aggregate.mean(),
            voter_count: receipt.aggregate.voter_count,
            vote_id: receipt.vote.id,
            episode_id: receipt.vote.episode_id,
            score: receipt.vote.score,
            late_participation: receipt.vote.late_participation,
        }
    }
}

/// The caller's own vote.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyVoteResponse {
    pub vote_id: String,
    pub score: Option<i32>,
    pub late_participation: bool,
}

impl From<star_vote::Model> for MyVoteResponse {
    fn from(vote: star_vote::Model) -> Self {
        Self {
            vote_id: vote.id,
            score: vote.score,
            late_participation: vote.late_participation,
        }
    }
}

/// Cast or edit request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    #[validate(range(min = 1, max = 10))]
    pub score: i32,

    #[validate(length(min = 1, max = 64))]
    pub vote_id: Option<String>,

    #[validate(length(max = 3000))]
    pub comment: Option<String>,
}

/// Get the voting status of an episode.
async fn show(
    State(state): State<AppState>,
    Path(episode_id): Path<String>,
) -> AppResult<ApiResponse<EpisodeResponse>> {
    let status = state.vote_service.episode_status(&episode_id).await?;
    Ok(ApiResponse::ok(status.into()))
}

/// Cast a vote, or edit an existing one.
async fn cast(
    current: CurrentVoter,
    State(state): State<AppState>,
    Path(episode_id): Path<String>,
    Json(req): Json<CastVoteRequest>,
) -> AppResult<(CookieJar, ApiResponse<VoteResponse>)> {
    req.validate()?;

    let input = CastVoteInput {
        score: req.score,
        vote_id: req.vote_id,
        comment: req.comment,
    };
    let receipt = state
        .vote_service
        .cast_or_update_vote(&episode_id, &current.voter, input)
        .await?;

    let response = if receipt.vote.updated_at.is_none() {
        ApiResponse::created(receipt.into())
    } else {
        ApiResponse::ok(receipt.into())
    };
    Ok((current.jar(), response))
}

/// Get the caller's vote for an episode.
async fn mine(
    current: CurrentVoter,
    State(state): State<AppState>,
    Path(episode_id): Path<String>,
) -> AppResult<ApiResponse<Option<MyVoteResponse>>> {
    let vote = state
        .vote_service
        .my_vote(&episode_id, &current.voter.identity)
        .await?;
    Ok(ApiResponse::ok(vote.map(Into::into)))
}

/// Withdraw a vote.
async fn withdraw(
    current: CurrentVoter,
    State(state): State<AppState>,
    Path((episode_id, vote_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<VoteResponse>> {
    let receipt = state
        .vote_service
        .withdraw_vote(&episode_id, &vote_id, &current.voter)
        .await?;
    Ok(ApiResponse::ok(receipt.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(show))
        .route("/{id}/votes", post(cast))
        .route("/{id}/votes/mine", get(mine))
        .route("/{id}/votes/{vote_id}", delete(withdraw))
}
