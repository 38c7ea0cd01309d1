//! Episode entity with its live vote aggregate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "episode")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning content item
    #[sea_orm(indexed)]
    pub content_item_id: String,

    /// Episode number within the title
    pub number: i32,

    /// Scheduled broadcast time
    #[sea_orm(indexed)]
    pub aired_at: DateTimeWithTimeZone,

    /// Broadcast break, no voting takes place
    pub is_break: bool,

    /// Number of counted star votes
    pub voter_count: i32,

    /// Star histogram (JSON array of 10 integers, index 0 = 1 star)
    #[sea_orm(column_type = "JsonBinary")]
    pub histogram: Json,

    /// Sum of all counted star values
    pub weighted_sum: i64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::content_item::Entity",
        from = "Column::ContentItemId",
        to = "super::content_item::Column::Id",
        on_delete = "Cascade"
    )]
    ContentItem,

    #[sea_orm(has_many = "super::star_vote::Entity")]
    StarVote,
}

impl Related<super::content_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentItem.def()
    }
}

impl Related<super::star_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StarVote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
