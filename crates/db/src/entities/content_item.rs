//! Content item entity (an anime title) with its rank history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// Rank of the first chart this title appeared on
    #[sea_orm(nullable)]
    pub debut_rank: Option<i32>,

    #[sea_orm(nullable)]
    pub debut_date: Option<Date>,

    /// Best rank ever reached
    #[sea_orm(nullable)]
    pub peak_rank: Option<i32>,

    /// Date the peak rank was (last) reached
    #[sea_orm(nullable)]
    pub peak_date: Option<Date>,

    /// Number of periods charted within the top-N cutoff
    pub weeks_on_top: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::episode::Entity")]
    Episode,

    #[sea_orm(has_many = "super::rank_snapshot::Entity")]
    RankSnapshot,
}

impl Related<super::episode::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Episode.def()
    }
}

impl Related<super::rank_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RankSnapshot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
