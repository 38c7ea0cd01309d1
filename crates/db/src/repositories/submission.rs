//! Submission repository.

use std::sync::Arc;

use crate::entities::{Submission, submission};
use anichart_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, SqlErr, sea_query::Expr,
};

/// Submission repository for database operations.
#[derive(Clone)]
pub struct SubmissionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubmissionRepository {
    /// Create a new submission repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a submission by ID.
    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<submission::Model>> {
        Submission::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the submission of an identity in a period.
    pub async fn find_by_principal<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
        principal_key: &str,
    ) -> AppResult<Option<submission::Model>> {
        Submission::find()
            .filter(submission::Column::PeriodId.eq(period_id))
            .filter(submission::Column::PrincipalKey.eq(principal_key))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new submission.
    ///
    /// A second submission for the same `(period, principal)` pair fails with
    /// [`AppError::AlreadyVoted`].
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: submission::ActiveModel,
    ) -> AppResult<submission::Model> {
        model.insert(conn).await.map_err(map_insert_error)
    }

    /// Number of submissions in a period that are not blocked.
    pub async fn count_unblocked<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
    ) -> AppResult<u64> {
        Submission::find()
            .filter(submission::Column::PeriodId.eq(period_id))
            .filter(submission::Column::Blocked.eq(false))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flip `blocked` on every submission of a period from the given network.
    ///
    /// Returns the number of submissions changed.
    pub async fn set_blocked_by_network<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
        network_hash: &str,
        blocked: bool,
    ) -> AppResult<u64> {
        let result = Submission::update_many()
            .col_expr(submission::Column::Blocked, Expr::value(blocked))
            .filter(submission::Column::PeriodId.eq(period_id))
            .filter(submission::Column::NetworkHash.eq(network_hash))
            .filter(submission::Column::Blocked.eq(!blocked))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Find the submission of an identity in a period, outside any transaction.
    pub async fn find_for_voter(
        &self,
        period_id: &str,
        principal_key: &str,
    ) -> AppResult<Option<submission::Model>> {
        self.find_by_principal(self.db.as_ref(), period_id, principal_key)
            .await
    }
}

fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::AlreadyVoted,
        _ => AppError::Database(err.to_string()),
    }
}
