//! Create rank snapshot table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RankSnapshot::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RankSnapshot::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RankSnapshot::PeriodId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(RankSnapshot::ContentItemId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RankSnapshot::EpisodeId).string_len(32).not_null())
                    .col(ColumnDef::new(RankSnapshot::Rank).integer().not_null())
                    .col(ColumnDef::new(RankSnapshot::RankDelta).integer())
                    .col(
                        ColumnDef::new(RankSnapshot::ConsecutiveWeeksAtRank)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(RankSnapshot::VotePercent).double().not_null())
                    .col(ColumnDef::new(RankSnapshot::BayesScore).double().not_null())
                    .col(ColumnDef::new(RankSnapshot::VoterCount).integer().not_null())
                    .col(
                        ColumnDef::new(RankSnapshot::MedalTier)
                            .string_len(16)
                            .not_null()
                            .default("unranked"),
                    )
                    .col(
                        ColumnDef::new(RankSnapshot::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rank_snapshot_period")
                            .from(RankSnapshot::Table, RankSnapshot::PeriodId)
                            .to(VotingPeriod::Table, VotingPeriod::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rank_snapshot_content_item")
                            .from(RankSnapshot::Table, RankSnapshot::ContentItemId)
                            .to(ContentItem::Table, ContentItem::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (period_id, content_item_id) - one row per title per period
        manager
            .create_index(
                Index::create()
                    .name("idx_rank_snapshot_period_content")
                    .table(RankSnapshot::Table)
                    .col(RankSnapshot::PeriodId)
                    .col(RankSnapshot::ContentItemId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: content_item_id (title history)
        manager
            .create_index(
                Index::create()
                    .name("idx_rank_snapshot_content_item_id")
                    .table(RankSnapshot::Table)
                    .col(RankSnapshot::ContentItemId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RankSnapshot::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RankSnapshot {
    Table,
    Id,
    PeriodId,
    ContentItemId,
    EpisodeId,
    Rank,
    RankDelta,
    ConsecutiveWeeksAtRank,
    VotePercent,
    BayesScore,
    VoterCount,
    MedalTier,
    CreatedAt,
}

#[derive(Iden)]
enum VotingPeriod {
    Table,
    Id,
}

#[derive(Iden)]
enum ContentItem {
    Table,
    Id,
}
