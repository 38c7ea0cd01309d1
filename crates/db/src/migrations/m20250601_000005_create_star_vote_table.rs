//! Create star vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StarVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StarVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StarVote::SubmissionId).string_len(32).not_null())
                    .col(ColumnDef::new(StarVote::EpisodeId).string_len(32).not_null())
                    .col(ColumnDef::new(StarVote::Score).integer())
                    .col(
                        ColumnDef::new(StarVote::LateParticipation)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(StarVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(StarVote::UpdatedAt).timestamp_with_time_zone())
                    .check(
                        Expr::col(StarVote::Score)
                            .is_null()
                            .or(Expr::col(StarVote::Score).between(1, 10)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_star_vote_submission")
                            .from(StarVote::Table, StarVote::SubmissionId)
                            .to(Submission::Table, Submission::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_star_vote_episode")
                            .from(StarVote::Table, StarVote::EpisodeId)
                            .to(Episode::Table, Episode::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (submission_id, episode_id) - one vote per identity per episode
        manager
            .create_index(
                Index::create()
                    .name("idx_star_vote_submission_episode")
                    .table(StarVote::Table)
                    .col(StarVote::SubmissionId)
                    .col(StarVote::EpisodeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: episode_id (recompute grouping)
        manager
            .create_index(
                Index::create()
                    .name("idx_star_vote_episode_id")
                    .table(StarVote::Table)
                    .col(StarVote::EpisodeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StarVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StarVote {
    Table,
    Id,
    SubmissionId,
    EpisodeId,
    Score,
    LateParticipation,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Submission {
    Table,
    Id,
}

#[derive(Iden)]
enum Episode {
    Table,
    Id,
}
