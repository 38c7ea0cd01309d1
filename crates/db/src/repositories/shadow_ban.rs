//! Shadow ban repository.

use std::sync::Arc;

use crate::entities::{ShadowBan, shadow_ban};
use anichart_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Shadow ban repository for database operations.
#[derive(Clone)]
pub struct ShadowBanRepository {
    db: Arc<DatabaseConnection>,
}

impl ShadowBanRepository {
    /// Create a new shadow ban repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether a hashed network identifier is banned.
    pub async fn is_banned(&self, network_hash: &str) -> AppResult<bool> {
        let count = ShadowBan::find()
            .filter(shadow_ban::Column::NetworkHash.eq(network_hash))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Find a ban entry by hashed network identifier.
    pub async fn find_by_hash(&self, network_hash: &str) -> AppResult<Option<shadow_ban::Model>> {
        ShadowBan::find()
            .filter(shadow_ban::Column::NetworkHash.eq(network_hash))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add a ban entry.
    pub async fn create(&self, model: shadow_ban::ActiveModel) -> AppResult<shadow_ban::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove the ban entry of a hashed network identifier.
    pub async fn delete_by_hash(&self, network_hash: &str) -> AppResult<u64> {
        let result = ShadowBan::delete_many()
            .filter(shadow_ban::Column::NetworkHash.eq(network_hash))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
