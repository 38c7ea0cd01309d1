//! Rank snapshot entity: one chart row per content item per voting period.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coarse rank band attached to a chart position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MedalTier {
    #[sea_orm(string_value = "gold")]
    Gold,
    #[sea_orm(string_value = "silver")]
    Silver,
    #[sea_orm(string_value = "bronze")]
    Bronze,
    #[sea_orm(string_value = "unranked")]
    Unranked,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rank_snapshot")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub period_id: String,

    #[sea_orm(indexed)]
    pub content_item_id: String,

    /// Episode that represented the title this period
    pub episode_id: String,

    /// Competition rank (ties share a rank)
    pub rank: i32,

    /// Previous rank minus current rank, null for a new entry
    #[sea_orm(nullable)]
    pub rank_delta: Option<i32>,

    pub consecutive_weeks_at_rank: i32,

    /// Share of the summed smoothed scores, in percent
    pub vote_percent: f64,

    pub bayes_score: f64,

    pub voter_count: i32,

    pub medal_tier: MedalTier,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::voting_period::Entity",
        from = "Column::PeriodId",
        to = "super::voting_period::Column::Id",
        on_delete = "Cascade"
    )]
    VotingPeriod,

    #[sea_orm(
        belongs_to = "super::content_item::Entity",
        from = "Column::ContentItemId",
        to = "super::content_item::Column::Id",
        on_delete = "Cascade"
    )]
    ContentItem,
}

impl Related<super::voting_period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VotingPeriod.def()
    }
}

impl Related<super::content_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
