//! Create voting period table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VotingPeriod::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VotingPeriod::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VotingPeriod::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VotingPeriod::EndAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VotingPeriod::ClosedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(VotingPeriod::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: start_at (periods never overlap)
        manager
            .create_index(
                Index::create()
                    .name("idx_voting_period_start_at")
                    .table(VotingPeriod::Table)
                    .col(VotingPeriod::StartAt)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: end_at (previous period lookup, due period scan)
        manager
            .create_index(
                Index::create()
                    .name("idx_voting_period_end_at")
                    .table(VotingPeriod::Table)
                    .col(VotingPeriod::EndAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VotingPeriod::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VotingPeriod {
    Table,
    Id,
    StartAt,
    EndAt,
    ClosedAt,
    CreatedAt,
}
