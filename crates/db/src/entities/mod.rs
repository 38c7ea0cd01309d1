//! Database entities.

pub mod content_item;
pub mod episode;
pub mod rank_snapshot;
pub mod shadow_ban;
pub mod star_vote;
pub mod submission;
pub mod voting_period;

pub use content_item::Entity as ContentItem;
pub use episode::Entity as Episode;
pub use rank_snapshot::Entity as RankSnapshot;
pub use shadow_ban::Entity as ShadowBan;
pub use star_vote::Entity as StarVote;
pub use submission::Entity as Submission;
pub use voting_period::Entity as VotingPeriod;
