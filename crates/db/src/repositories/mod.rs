//! Database repositories.

pub mod content_item;
pub mod episode;
pub mod rank_snapshot;
pub mod shadow_ban;
pub mod star_vote;
pub mod submission;
pub mod voting_period;

pub use content_item::ContentItemRepository;
pub use episode::EpisodeRepository;
pub use rank_snapshot::RankSnapshotRepository;
pub use shadow_ban::ShadowBanRepository;
pub use star_vote::StarVoteRepository;
pub use submission::SubmissionRepository;
pub use voting_period::VotingPeriodRepository;
