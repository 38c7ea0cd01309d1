//! Bayesian smoothing of episode averages.

use crate::aggregate::EpisodeAggregate;
use serde::Serialize;

/// Share of unique voters used as a floor for the prior strength.
const VOTER_SHARE: f64 = 0.25;
/// Bounds of the baseline prior strength.
const MIN_STRENGTH: f64 = 10.0;
const MAX_STRENGTH: f64 = 40.0;
/// Extra strength per missing vote of an under-sampled episode.
const DEFICIT_WEIGHT: f64 = 0.5;
const MAX_DYNAMIC_STRENGTH: f64 = 100.0;

/// Per-episode input of the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeStats {
    /// Episode id.
    pub episode_id: String,
    /// Owning content item id.
    pub content_item_id: String,
    /// Counted votes.
    pub voter_count: u32,
    /// Sum of counted star values.
    pub weighted_sum: u64,
}

impl EpisodeStats {
    /// Stats of an episode from its recomputed aggregate.
    #[must_use]
    pub fn new(episode_id: &str, content_item_id: &str, aggregate: &EpisodeAggregate) -> Self {
        Self {
            episode_id: episode_id.to_string(),
            content_item_id: content_item_id.to_string(),
            voter_count: aggregate.voter_count,
            weighted_sum: aggregate.weighted_sum,
        }
    }

    /// Raw star average, zero without votes.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.voter_count == 0 {
            0.0
        } else {
            self.weighted_sum as f64 / f64::from(self.voter_count)
        }
    }
}

/// Global prior of one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prior {
    /// Distinct unblocked submissions in the period.
    pub unique_voters: u32,
    /// Votes below which an episode is under-sampled.
    pub min_votes: u32,
    /// Global mean `C`.
    pub global_mean: f64,
    /// Baseline strength `m`.
    pub strength: f64,
}

impl Prior {
    /// Compute the prior over the voted episodes of a period.
    #[must_use]
    pub fn from_stats(stats: &[EpisodeStats], unique_voters: u32) -> Self {
        let total_votes: u64 = stats.iter().map(|s| u64::from(s.voter_count)).sum();
        let total_weighted: u64 = stats.iter().map(|s| s.weighted_sum).sum();

        let global_mean = if total_votes == 0 {
            0.0
        } else {
            total_weighted as f64 / total_votes as f64
        };

        let mut counts: Vec<f64> = stats.iter().map(|s| f64::from(s.voter_count)).collect();
        counts.sort_by(f64::total_cmp);

        let share = (f64::from(unique_voters) * VOTER_SHARE).round();
        let strength = median(&counts)
            .max(percentile(&counts, 0.75))
            .max(share)
            .clamp(MIN_STRENGTH, MAX_STRENGTH);

        Self {
            unique_voters,
            // ceil(10% of unique voters), kept in integers
            min_votes: unique_voters.div_ceil(10),
            global_mean,
            strength,
        }
    }

    /// Strength applied to an episode with `voter_count` votes.
    #[must_use]
    pub fn dynamic_strength(&self, voter_count: u32) -> f64 {
        let deficit = self.min_votes.saturating_sub(voter_count);
        (self.strength + DEFICIT_WEIGHT * f64::from(deficit)).min(MAX_DYNAMIC_STRENGTH)
    }

    /// Smoothed score of an episode.
    #[must_use]
    pub fn score(&self, stats: &EpisodeStats) -> f64 {
        let strength = self.dynamic_strength(stats.voter_count);
        (stats.weighted_sum as f64 + strength * self.global_mean)
            / (f64::from(stats.voter_count) + strength)
    }
}

/// An episode with its smoothed score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredEpisode {
    /// Raw stats.
    #[serde(flatten)]
    pub stats: EpisodeStats,
    /// Strength the score was computed with.
    pub dynamic_strength: f64,
    /// Bayesian score.
    pub bayes_score: f64,
}

/// Score every voted episode of a period. Episodes without votes are dropped.
#[must_use]
pub fn normalize(stats: Vec<EpisodeStats>, unique_voters: u32) -> (Prior, Vec<ScoredEpisode>) {
    let voted: Vec<EpisodeStats> = stats.into_iter().filter(|s| s.voter_count > 0).collect();
    let prior = Prior::from_stats(&voted, unique_voters);

    let scored = voted
        .into_iter()
        .map(|stats| ScoredEpisode {
            dynamic_strength: prior.dynamic_strength(stats.voter_count),
            bayes_score: prior.score(&stats),
            stats,
        })
        .collect();

    (prior, scored)
}

fn median(sorted: &[f64]) -> f64 {
    percentile(sorted, 0.5)
}

/// Interpolated percentile of sorted values, `pos = p * (n - 1)`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = p * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let fraction = pos - pos.floor();
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stats(id: &str, voter_count: u32, weighted_sum: u64) -> EpisodeStats {
        EpisodeStats {
            episode_id: id.to_string(),
            content_item_id: format!("title-{id}"),
            voter_count,
            weighted_sum,
        }
    }

    #[test]
    fn test_percentile() {
        assert_eq!(percentile(&[], 0.75), 0.0);
        assert_eq!(percentile(&[7.0], 0.75), 7.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 0.75), 3.25);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[1.0, 5.0, 9.0]), 5.0);
    }

    #[test]
    fn test_min_votes_rounds_up() {
        assert_eq!(Prior::from_stats(&[], 20).min_votes, 2);
        assert_eq!(Prior::from_stats(&[], 21).min_votes, 3);
        assert_eq!(Prior::from_stats(&[], 30).min_votes, 3);
        assert_eq!(Prior::from_stats(&[], 0).min_votes, 0);
    }

    #[test]
    fn test_strength_is_clamped() {
        let few = Prior::from_stats(&[stats("a", 2, 10)], 4);
        assert_eq!(few.strength, 10.0);

        let many = Prior::from_stats(&[stats("a", 500, 4000), stats("b", 300, 2400)], 1000);
        assert_eq!(many.strength, 40.0);
    }

    #[test]
    fn test_strength_uses_largest_candidate() {
        // counts 12, 20, 28, 36: median 24, p75 30, quarter of voters 15
        let input = [
            stats("a", 12, 60),
            stats("b", 20, 100),
            stats("c", 28, 140),
            stats("d", 36, 180),
        ];
        let prior = Prior::from_stats(&input, 60);

        assert_eq!(prior.strength, 30.0);
        assert_eq!(prior.global_mean, 5.0);
    }

    #[test]
    fn test_empty_period_mean_is_zero() {
        let prior = Prior::from_stats(&[], 0);
        assert_eq!(prior.global_mean, 0.0);
        assert_eq!(prior.strength, 10.0);
    }

    #[test]
    fn test_dynamic_strength_shrinks_toward_min_votes() {
        let prior = Prior::from_stats(&[], 100);
        assert_eq!(prior.min_votes, 10);

        let mut last = f64::INFINITY;
        for voter_count in 1..=10 {
            let strength = prior.dynamic_strength(voter_count);
            assert!(strength < last);
            last = strength;
        }
        assert_eq!(prior.dynamic_strength(10), prior.strength);
        assert_eq!(prior.dynamic_strength(50), prior.strength);
    }

    #[test]
    fn test_dynamic_strength_cap() {
        let prior = Prior::from_stats(&[], 2000);
        assert_eq!(prior.dynamic_strength(0), 100.0);
    }

    #[test]
    fn test_normalize_drops_unvoted() {
        let (prior, scored) = normalize(vec![stats("a", 10, 90), stats("b", 0, 0)], 20);

        assert_eq!(scored.len(), 1);
        assert_eq!(prior.global_mean, 9.0);
        assert!((scored[0].bayes_score - 9.0).abs() < 1e-9);
    }
}
