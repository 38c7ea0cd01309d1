//! Voting period repository.

use std::sync::Arc;

use crate::entities::{VotingPeriod, voting_period};
use anichart_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// Voting period repository for database operations.
#[derive(Clone)]
pub struct VotingPeriodRepository {
    db: Arc<DatabaseConnection>,
}

impl VotingPeriodRepository {
    /// Create a new voting period repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a period by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<voting_period::Model>> {
        VotingPeriod::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a period by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<voting_period::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Voting period not found: {id}")))
    }

    /// Get a period by ID on the given connection.
    pub async fn get_by_id_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<voting_period::Model> {
        VotingPeriod::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Voting period not found: {id}")))
    }

    /// Create a new period.
    pub async fn create(&self, model: voting_period::ActiveModel) -> AppResult<voting_period::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The period whose `[start_at, end_at)` range contains `at`.
    pub async fn get_containing<C: ConnectionTrait>(
        &self,
        conn: &C,
        at: DateTimeWithTimeZone,
    ) -> AppResult<voting_period::Model> {
        VotingPeriod::find()
            .filter(voting_period::Column::StartAt.lte(at))
            .filter(voting_period::Column::EndAt.gt(at))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("No voting period contains {at}")))
    }

    /// The period ending exactly where `period` starts.
    pub async fn find_previous<C: ConnectionTrait>(
        &self,
        conn: &C,
        period: &voting_period::Model,
    ) -> AppResult<Option<voting_period::Model>> {
        VotingPeriod::find()
            .filter(voting_period::Column::EndAt.eq(period.start_at))
            .order_by_desc(voting_period::Column::StartAt)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Unclosed periods that ended at or before `cutoff`, oldest first.
    pub async fn find_due(&self, cutoff: DateTimeWithTimeZone) -> AppResult<Vec<voting_period::Model>> {
        VotingPeriod::find()
            .filter(voting_period::Column::ClosedAt.is_null())
            .filter(voting_period::Column::EndAt.lte(cutoff))
            .order_by_asc(voting_period::Column::EndAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recently closed period.
    pub async fn find_latest_closed(&self) -> AppResult<Option<voting_period::Model>> {
        VotingPeriod::find()
            .filter(voting_period::Column::ClosedAt.is_not_null())
            .order_by_desc(voting_period::Column::EndAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record that the weekly close has published this period.
    pub async fn mark_closed<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        closed_at: DateTimeWithTimeZone,
    ) -> AppResult<()> {
        VotingPeriod::update_many()
            .col_expr(voting_period::Column::ClosedAt, Expr::value(closed_at))
            .filter(voting_period::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
