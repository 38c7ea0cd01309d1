//! Create episode table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Episode::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Episode::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Episode::ContentItemId).string_len(32).not_null())
                    .col(ColumnDef::new(Episode::Number).integer().not_null())
                    .col(
                        ColumnDef::new(Episode::AiredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Episode::IsBreak).boolean().not_null().default(false))
                    .col(ColumnDef::new(Episode::VoterCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Episode::Histogram)
                            .json_binary()
                            .not_null()
                            .default("[0,0,0,0,0,0,0,0,0,0]"),
                    )
                    .col(
                        ColumnDef::new(Episode::WeightedSum)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Episode::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_episode_content_item")
                            .from(Episode::Table, Episode::ContentItemId)
                            .to(ContentItem::Table, ContentItem::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: content_item_id (episodes of a title)
        manager
            .create_index(
                Index::create()
                    .name("idx_episode_content_item_id")
                    .table(Episode::Table)
                    .col(Episode::ContentItemId)
                    .to_owned(),
            )
            .await?;

        // Index: aired_at (episodes within a period)
        manager
            .create_index(
                Index::create()
                    .name("idx_episode_aired_at")
                    .table(Episode::Table)
                    .col(Episode::AiredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Episode::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Episode {
    Table,
    Id,
    ContentItemId,
    Number,
    AiredAt,
    IsBreak,
    VoterCount,
    Histogram,
    WeightedSum,
    CreatedAt,
}

#[derive(Iden)]
enum ContentItem {
    Table,
    Id,
}
