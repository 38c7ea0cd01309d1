//! Live star aggregate kept on every episode.
//!
//! All mutation goes through [`EpisodeAggregate`], both for the incremental
//! updates made while votes come in and for the batch rebuild at week close.

use anichart_common::{AppError, AppResult};
use anichart_db::entities::episode;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Number of star buckets.
pub const BUCKETS: usize = 10;

/// A star rating between 1 and 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StarScore(u8);

impl StarScore {
    /// Validate a raw score.
    pub fn new(value: i32) -> AppResult<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=10).contains(v))
            .map(Self)
            .ok_or_else(|| AppError::Validation(format!("score must be between 1 and 10, got {value}")))
    }

    /// Raw star value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0 as i32
    }

    const fn bucket(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<i32> for StarScore {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Effect of a single vote write on an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    /// Nothing to adjust.
    Unchanged,
    /// A new score is counted.
    Added(StarScore),
    /// A counted score is withdrawn.
    Removed(StarScore),
    /// A counted score is edited.
    Replaced {
        /// Previous score.
        from: StarScore,
        /// New score.
        to: StarScore,
    },
}

impl ScoreChange {
    /// Change needed to go from `old` to `new`.
    #[must_use]
    pub fn between(old: Option<StarScore>, new: Option<StarScore>) -> Self {
        match (old, new) {
            (None, None) => Self::Unchanged,
            (None, Some(score)) => Self::Added(score),
            (Some(score), None) => Self::Removed(score),
            (Some(from), Some(to)) if from == to => Self::Unchanged,
            (Some(from), Some(to)) => Self::Replaced { from, to },
        }
    }
}

/// Voter count, histogram and weighted sum of one episode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeAggregate {
    /// Number of counted votes.
    pub voter_count: u32,
    /// Votes per star value, index 0 holds one-star votes.
    pub histogram: [u32; BUCKETS],
    /// Sum of all counted star values.
    pub weighted_sum: u64,
}

impl EpisodeAggregate {
    /// Build an aggregate from scratch out of a set of scores.
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = StarScore>,
    {
        let mut aggregate = Self::default();
        for score in scores {
            aggregate.add(score);
        }
        aggregate
    }

    /// Read the aggregate stored on an episode row, checking its invariants.
    pub fn from_model(model: &episode::Model) -> AppResult<Self> {
        let buckets: Vec<u32> = serde_json::from_value(model.histogram.clone()).map_err(|e| {
            AppError::InconsistentAggregate(format!("episode {}: bad histogram: {e}", model.id))
        })?;
        let histogram: [u32; BUCKETS] = buckets.try_into().map_err(|b: Vec<u32>| {
            AppError::InconsistentAggregate(format!(
                "episode {}: histogram has {} buckets",
                model.id,
                b.len()
            ))
        })?;

        let aggregate = Self {
            voter_count: u32::try_from(model.voter_count).map_err(|_| {
                AppError::InconsistentAggregate(format!(
                    "episode {}: negative voter count",
                    model.id
                ))
            })?,
            histogram,
            weighted_sum: u64::try_from(model.weighted_sum).map_err(|_| {
                AppError::InconsistentAggregate(format!(
                    "episode {}: negative weighted sum",
                    model.id
                ))
            })?,
        };
        aggregate.check()?;
        Ok(aggregate)
    }

    /// Count a new score.
    pub fn add(&mut self, score: StarScore) {
        self.histogram[score.bucket()] += 1;
        self.voter_count += 1;
        self.weighted_sum += u64::from(score.0);
    }

    /// Withdraw a counted score.
    pub fn remove(&mut self, score: StarScore) -> AppResult<()> {
        let bucket = &mut self.histogram[score.bucket()];
        if *bucket == 0 || self.voter_count == 0 {
            return Err(AppError::InconsistentAggregate(format!(
                "no {}-star vote left to remove",
                score.value()
            )));
        }
        *bucket -= 1;
        self.voter_count -= 1;
        self.weighted_sum -= u64::from(score.0);
        Ok(())
    }

    /// Apply the effect of one vote write.
    pub fn apply(&mut self, change: ScoreChange) -> AppResult<()> {
        match change {
            ScoreChange::Unchanged => {}
            ScoreChange::Added(score) => self.add(score),
            ScoreChange::Removed(score) => self.remove(score)?,
            ScoreChange::Replaced { from, to } => {
                self.remove(from)?;
                self.add(to);
            }
        }
        Ok(())
    }

    /// Raw star average, `None` without votes.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        (self.voter_count > 0).then(|| self.weighted_sum as f64 / f64::from(self.voter_count))
    }

    /// Verify `sum(histogram) == voter_count` and the weighted sum.
    pub fn check(&self) -> AppResult<()> {
        let count: u64 = self.histogram.iter().map(|&n| u64::from(n)).sum();
        let weighted: u64 = self
            .histogram
            .iter()
            .zip(1u64..)
            .map(|(&n, stars)| u64::from(n) * stars)
            .sum();

        if count != u64::from(self.voter_count) {
            return Err(AppError::InconsistentAggregate(format!(
                "histogram holds {count} votes but voter count is {}",
                self.voter_count
            )));
        }
        if weighted != self.weighted_sum {
            return Err(AppError::InconsistentAggregate(format!(
                "histogram weighs {weighted} but weighted sum is {}",
                self.weighted_sum
            )));
        }
        Ok(())
    }

    /// Column values for the episode row: voter count, histogram, weighted sum.
    pub fn to_columns(&self) -> AppResult<(i32, JsonValue, i64)> {
        let voter_count = i32::try_from(self.voter_count)
            .map_err(|_| AppError::InconsistentAggregate("voter count overflow".to_string()))?;
        let weighted_sum = i64::try_from(self.weighted_sum)
            .map_err(|_| AppError::InconsistentAggregate("weighted sum overflow".to_string()))?;
        Ok((voter_count, serde_json::json!(self.histogram), weighted_sum))
    }
}
