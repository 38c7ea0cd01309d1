//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_content_item_table;
mod m20250601_000002_create_episode_table;
mod m20250601_000003_create_voting_period_table;
mod m20250601_000004_create_submission_table;
mod m20250601_000005_create_star_vote_table;
mod m20250601_000006_create_shadow_ban_table;
mod m20250601_000007_create_rank_snapshot_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_content_item_table::Migration),
            Box::new(m20250601_000002_create_episode_table::Migration),
            Box::new(m20250601_000003_create_voting_period_table::Migration),
            Box::new(m20250601_000004_create_submission_table::Migration),
            Box::new(m20250601_000005_create_star_vote_table::Migration),
            Box::new(m20250601_000006_create_shadow_ban_table::Migration),
            Box::new(m20250601_000007_create_rank_snapshot_table::Migration),
        ]
    }
}
