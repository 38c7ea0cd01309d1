//! Star vote repository.

use std::sync::Arc;

use crate::entities::{StarVote, Submission, star_vote, submission};
use anichart_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Star vote repository for database operations.
#[derive(Clone)]
pub struct StarVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl StarVoteRepository {
    /// Create a new star vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a vote by ID.
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<star_vote::Model>> {
        StarVote::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the vote a submission holds for an episode.
    pub async fn find_by_submission_and_episode<C: ConnectionTrait>(
        &self,
        conn: &C,
        submission_id: &str,
        episode_id: &str,
    ) -> AppResult<Option<star_vote::Model>> {
        StarVote::find()
            .filter(star_vote::Column::SubmissionId.eq(submission_id))
            .filter(star_vote::Column::EpisodeId.eq(episode_id))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the vote a submission holds for an episode, outside any transaction.
    pub async fn find_for_episode(
        &self,
        submission_id: &str,
        episode_id: &str,
    ) -> AppResult<Option<star_vote::Model>> {
        self.find_by_submission_and_episode(self.db.as_ref(), submission_id, episode_id)
            .await
    }

    /// Create a new vote.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: star_vote::ActiveModel,
    ) -> AppResult<star_vote::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an existing vote.
    pub async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: star_vote::ActiveModel,
    ) -> AppResult<star_vote::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Votes that count towards a period's chart: score present, submission not blocked.
    pub async fn find_eligible_in_period<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
    ) -> AppResult<Vec<star_vote::Model>> {
        StarVote::find()
            .inner_join(Submission)
            .filter(submission::Column::PeriodId.eq(period_id))
            .filter(submission::Column::Blocked.eq(false))
            .filter(star_vote::Column::Score.is_not_null())
            .order_by_asc(star_vote::Column::EpisodeId)
            .order_by_asc(star_vote::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
