//! Create shadow ban table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShadowBan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShadowBan::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShadowBan::NetworkHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ShadowBan::Reason).string_len(512))
                    .col(
                        ColumnDef::new(ShadowBan::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShadowBan::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ShadowBan {
    Table,
    Id,
    NetworkHash,
    Reason,
    CreatedAt,
}
