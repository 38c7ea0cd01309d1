//! Rank snapshot repository.

use std::sync::Arc;

use crate::entities::{RankSnapshot, rank_snapshot};
use anichart_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Rank snapshot repository for database operations.
#[derive(Clone)]
pub struct RankSnapshotRepository {
    db: Arc<DatabaseConnection>,
}

impl RankSnapshotRepository {
    /// Create a new rank snapshot repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Chart rows of a period in rank order.
    pub async fn find_by_period<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
    ) -> AppResult<Vec<rank_snapshot::Model>> {
        RankSnapshot::find()
            .filter(rank_snapshot::Column::PeriodId.eq(period_id))
            .order_by_asc(rank_snapshot::Column::Rank)
            .order_by_desc(rank_snapshot::Column::VoterCount)
            .order_by_asc(rank_snapshot::Column::ContentItemId)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Chart rows of a period, outside any transaction.
    pub async fn find_chart(&self, period_id: &str) -> AppResult<Vec<rank_snapshot::Model>> {
        self.find_by_period(self.db.as_ref(), period_id).await
    }

    /// Whether the weekly close already published rows for a period.
    pub async fn exists_for_period<C: ConnectionTrait>(
        &self,
        conn: &C,
        period_id: &str,
    ) -> AppResult<bool> {
        let count = RankSnapshot::find()
            .filter(rank_snapshot::Column::PeriodId.eq(period_id))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Chart history of a content item, newest first.
    pub async fn find_by_content_item(
        &self,
        content_item_id: &str,
        limit: u64,
    ) -> AppResult<Vec<rank_snapshot::Model>> {
        RankSnapshot::find()
            .filter(rank_snapshot::Column::ContentItemId.eq(content_item_id))
            .order_by_desc(rank_snapshot::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a whole chart.
    pub async fn insert_chart<C: ConnectionTrait>(
        &self,
        conn: &C,
        rows: Vec<rank_snapshot::ActiveModel>,
    ) -> AppResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        RankSnapshot::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
