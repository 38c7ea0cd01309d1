//! Create submission table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submission::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submission::PeriodId).string_len(32).not_null())
                    .col(ColumnDef::new(Submission::PrincipalKey).string_len(64).not_null())
                    .col(ColumnDef::new(Submission::MemberId).string_len(64))
                    .col(ColumnDef::new(Submission::NetworkHash).string_len(64))
                    .col(
                        ColumnDef::new(Submission::Blocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Submission::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submission_period")
                            .from(Submission::Table, Submission::PeriodId)
                            .to(VotingPeriod::Table, VotingPeriod::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (period_id, principal_key) - one submission per identity per period
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_period_principal")
                    .table(Submission::Table)
                    .col(Submission::PeriodId)
                    .col(Submission::PrincipalKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: network_hash (bulk suppression)
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_network_hash")
                    .table(Submission::Table)
                    .col(Submission::NetworkHash)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Submission {
    Table,
    Id,
    PeriodId,
    PrincipalKey,
    MemberId,
    NetworkHash,
    Blocked,
    CreatedAt,
}

#[derive(Iden)]
enum VotingPeriod {
    Table,
    Id,
}
