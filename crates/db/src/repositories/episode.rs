//! Episode repository.

use std::sync::Arc;

use crate::entities::{Episode, episode};
use anichart_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use serde_json::Value as JsonValue;

/// Episode repository for database operations.
#[derive(Clone)]
pub struct EpisodeRepository {
    db: Arc<DatabaseConnection>,
}

impl EpisodeRepository {
    /// Create a new episode repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an episode by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<episode::Model>> {
        Episode::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an episode by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<episode::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Episode not found: {id}")))
    }

    /// Create a new episode.
    pub async fn create(&self, model: episode::ActiveModel) -> AppResult<episode::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load an episode and hold its row lock until the surrounding transaction ends.
    pub async fn get_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<episode::Model> {
        Episode::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Episode not found: {id}")))
    }

    /// Episodes scheduled inside `[start, end)`, locked for update.
    pub async fn find_aired_between<C: ConnectionTrait>(
        &self,
        conn: &C,
        start: DateTimeWithTimeZone,
        end: DateTimeWithTimeZone,
    ) -> AppResult<Vec<episode::Model>> {
        Episode::find()
            .filter(episode::Column::AiredAt.gte(start))
            .filter(episode::Column::AiredAt.lt(end))
            .order_by_asc(episode::Column::AiredAt)
            .order_by_asc(episode::Column::Id)
            .lock_exclusive()
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite the stored aggregate of an episode.
    pub async fn write_aggregate<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        voter_count: i32,
        histogram: JsonValue,
        weighted_sum: i64,
    ) -> AppResult<()> {
        let result = Episode::update_many()
            .col_expr(episode::Column::VoterCount, Expr::value(voter_count))
            .col_expr(episode::Column::Histogram, Expr::value(histogram))
            .col_expr(episode::Column::WeightedSum, Expr::value(weighted_sum))
            .filter(episode::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Episode not found: {id}")));
        }
        Ok(())
    }
}
