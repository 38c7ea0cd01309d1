//! Submission entity: one voting identity per voting period.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub period_id: String,

    /// Per-period identity hash (unique together with `period_id`)
    pub principal_key: String,

    /// Member ID when the voter was logged in
    #[sea_orm(nullable)]
    pub member_id: Option<String>,

    /// Salted hash of the voter's network identifier
    #[sea_orm(nullable, indexed)]
    pub network_hash: Option<String>,

    /// Shadow-banned or withdrawn by moderation; votes are kept but not counted
    pub blocked: bool,

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

    #[sea_orm(has_many = "super::star_vote::Entity")]
    StarVote,
}

impl Related<super::voting_period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VotingPeriod.def()
    }
}

impl Related<super::star_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StarVote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
