//! Business logic services.

pub mod chart;
pub mod vote;

pub use chart::{ChartService, PeriodChart, RankHistory, RecomputedEpisode, SuppressionReport};
pub use vote::{CastVoteInput, EpisodeStatus, VoteReceipt, VoteService, Voter};
