//! Voting period (week) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "voting_period")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Inclusive start of the week
    #[sea_orm(indexed)]
    pub start_at: DateTimeWithTimeZone,

    /// Exclusive end of the week
    #[sea_orm(indexed)]
    pub end_at: DateTimeWithTimeZone,

    /// When the weekly close published this period's chart
    #[sea_orm(nullable)]
    pub closed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::submission::Entity")]
    Submission,

    #[sea_orm(has_many = "super::rank_snapshot::Entity")]
    RankSnapshot,
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl Related<super::rank_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RankSnapshot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
