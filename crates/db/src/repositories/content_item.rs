//! Content item repository.

use std::sync::Arc;

use crate::entities::{ContentItem, content_item};
use anichart_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

/// Content item repository for database operations.
#[derive(Clone)]
pub struct ContentItemRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentItemRepository {
    /// Create a new content item repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a content item by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<content_item::Model>> {
        ContentItem::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a content item by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<content_item::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content item not found: {id}")))
    }

    /// Create a new content item.
    pub async fn create(&self, model: content_item::ActiveModel) -> AppResult<content_item::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load several content items at once.
    pub async fn find_by_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        ids: &[String],
    ) -> AppResult<Vec<content_item::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        ContentItem::find()
            .filter(content_item::Column::Id.is_in(ids.iter().cloned()))
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write the rank history fields of a content item.
    pub async fn update_history<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: content_item::ActiveModel,
    ) -> AppResult<content_item::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
