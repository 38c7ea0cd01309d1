//! Create content item table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContentItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentItem::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContentItem::Title).string_len(512).not_null())
                    .col(ColumnDef::new(ContentItem::DebutRank).integer())
                    .col(ColumnDef::new(ContentItem::DebutDate).date())
                    .col(ColumnDef::new(ContentItem::PeakRank).integer())
                    .col(ColumnDef::new(ContentItem::PeakDate).date())
                    .col(
                        ColumnDef::new(ContentItem::WeeksOnTop)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContentItem::CreatedAt)
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
            .drop_table(Table::drop().table(ContentItem::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ContentItem {
    Table,
    Id,
    Title,
    DebutRank,
    DebutDate,
    PeakRank,
    PeakDate,
    WeeksOnTop,
    CreatedAt,
}
