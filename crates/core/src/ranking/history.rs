//! Week-over-week rank history.

use anichart_db::entities::rank_snapshot::MedalTier;
use chrono::NaiveDate;

/// Medal tier of a chart position.
#[must_use]
pub const fn medal_tier(rank: u32) -> MedalTier {
    match rank {
        1 => MedalTier::Gold,
        2..=3 => MedalTier::Silver,
        4..=10 => MedalTier::Bronze,
        _ => MedalTier::Unranked,
    }
}

/// A title's placement in the immediately preceding period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousPlacement {
    /// Rank last period.
    pub rank: u32,
    /// Consecutive weeks the title had held that rank.
    pub consecutive_weeks_at_rank: u32,
}

/// Running history fields stored on a content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFields {
    /// First rank ever charted.
    pub debut_rank: Option<u32>,
    /// Date of the first chart.
    pub debut_date: Option<NaiveDate>,
    /// Best rank reached.
    pub peak_rank: Option<u32>,
    /// Date the peak was reached.
    pub peak_date: Option<NaiveDate>,
    /// Periods placed within the top-N cutoff.
    pub weeks_on_top: u32,
}

/// Result of merging one chart row with its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedPlacement {
    /// `previous - current`, positive when the title climbed.
    pub rank_delta: Option<i32>,
    /// Weeks in a row at the current rank, including this one.
    pub consecutive_weeks_at_rank: u32,
    /// Tier of the current rank.
    pub medal_tier: MedalTier,
    /// Updated history fields.
    pub history: HistoryFields,
}

/// Merge this period's rank into a title's history.
#[must_use]
pub fn merge(
    rank: u32,
    previous: Option<PreviousPlacement>,
    history: HistoryFields,
    chart_date: NaiveDate,
    top_n: u32,
) -> MergedPlacement {
    let rank_delta = previous.map(|p| p.rank as i32 - rank as i32);
    let consecutive_weeks_at_rank = match previous {
        Some(p) if p.rank == rank => p.consecutive_weeks_at_rank + 1,
        _ => 1,
    };

    let mut history = history;
    if history.debut_rank.is_none() {
        history.debut_rank = Some(rank);
        history.debut_date = Some(chart_date);
    }
    if history.peak_rank.is_none_or(|peak| rank < peak) {
        history.peak_rank = Some(rank);
        history.peak_date = Some(chart_date);
    }
    if rank <= top_n {
        history.weeks_on_top += 1;
    }

    MergedPlacement {
        rank_delta,
        consecutive_weeks_at_rank,
        medal_tier: medal_tier(rank),
        history,
    }
}
