//! Weekly ranking pipeline: smoothing, chart order and rank history.

pub mod chart;
pub mod history;
pub mod normalizer;

pub use chart::{ChartEntry, build_chart, compare, score_epsilon};
pub use history::{HistoryFields, MergedPlacement, PreviousPlacement, medal_tier, merge};
pub use normalizer::{EpisodeStats, Prior, ScoredEpisode, normalize};
