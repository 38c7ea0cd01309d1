//! End-to-end tests of the ranking pipeline without a database.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use anichart_core::{
    EpisodeAggregate, ScoreChange, StarScore,
    ranking::{self, EpisodeStats, HistoryFields, Prior, ScoredEpisode, build_chart, compare, normalize},
};
use anichart_db::entities::rank_snapshot::MedalTier;
use chrono::NaiveDate;

fn star(value: i32) -> StarScore {
    StarScore::new(value).unwrap()
}

fn stats(id: &str, scores: &[i32]) -> EpisodeStats {
    let aggregate = EpisodeAggregate::from_scores(scores.iter().map(|&s| star(s)));
    EpisodeStats::new(id, &format!("title-{id}"), &aggregate)
}

/// In-memory stand-in for the submission ledger of one period.
#[derive(Default)]
struct Ledger {
    blocked: HashMap<String, bool>,
    votes: HashMap<(String, String), Option<StarScore>>,
    live: HashMap<String, EpisodeAggregate>,
}

impl Ledger {
    fn cast(&mut self, principal: &str, episode: &str, score: i32) {
        let blocked = *self.blocked.entry(principal.to_string()).or_insert(false);
        let slot = self
            .votes
            .entry((principal.to_string(), episode.to_string()))
            .or_insert(None);
        let change = ScoreChange::between(*slot, Some(star(score)));
        *slot = Some(star(score));
        if !blocked {
            self.live.entry(episode.to_string()).or_default().apply(change).unwrap();
        }
    }

    fn withdraw(&mut self, principal: &str, episode: &str) {
        let blocked = self.blocked[principal];
        let slot = self
            .votes
            .get_mut(&(principal.to_string(), episode.to_string()))
            .unwrap();
        let old = slot.take().unwrap();
        if !blocked {
            self.live
                .get_mut(episode)
                .unwrap()
                .apply(ScoreChange::Removed(old))
                .unwrap();
        }
    }

    fn batch(&self, episode: &str) -> EpisodeAggregate {
        EpisodeAggregate::from_scores(self.votes.iter().filter_map(|((principal, ep), score)| {
            (ep == episode && !self.blocked[principal]).then_some(*score).flatten()
        }))
    }
}

#[test]
fn batch_recompute_counts_only_eligible_votes() {
    let mut ledger = Ledger::default();
    ledger.cast("a", "ep1", 9);
    ledger.cast("b", "ep1", 7);
    ledger.cast("c", "ep1", 2);
    ledger.cast("d", "ep1", 10);
    ledger.withdraw("d", "ep1");

    // banned after voting: stays in the live aggregate until the rebuild
    ledger.blocked.insert("c".to_string(), true);

    let live = &ledger.live["ep1"];
    assert_eq!(live.voter_count, 3);

    let rebuilt = ledger.batch("ep1");
    assert_eq!(rebuilt.voter_count, 2);
    assert_eq!(rebuilt.mean(), Some(8.0));
    rebuilt.check().unwrap();
}

#[test]
fn incremental_and_batch_agree_without_suppression() {
    let mut ledger = Ledger::default();
    for (i, score) in [3, 8, 8, 10, 1, 6].into_iter().enumerate() {
        ledger.cast(&format!("p{i}"), "ep1", score);
    }
    ledger.cast("p1", "ep1", 5);
    ledger.withdraw("p4", "ep1");

    assert_eq!(ledger.live["ep1"], ledger.batch("ep1"));
}

#[test]
fn second_cast_updates_instead_of_counting_twice() {
    let mut ledger = Ledger::default();
    ledger.cast("a", "ep1", 6);
    ledger.cast("a", "ep1", 9);

    assert_eq!(ledger.votes.len(), 1);
    assert_eq!(ledger.live["ep1"].voter_count, 1);
    assert_eq!(ledger.live["ep1"].weighted_sum, 9);
}

#[test]
fn withdraw_then_recast_restores_aggregate() {
    let mut ledger = Ledger::default();
    ledger.cast("a", "ep1", 7);
    ledger.cast("b", "ep1", 4);
    let before = ledger.live["ep1"].clone();

    ledger.withdraw("a", "ep1");
    assert_eq!(ledger.live["ep1"].voter_count, 1);

    ledger.cast("a", "ep1", 7);
    assert_eq!(ledger.live["ep1"], before);
}

#[test]
fn suppressed_voter_never_touches_live_aggregate() {
    let mut ledger = Ledger::default();
    ledger.blocked.insert("spam".to_string(), true);
    ledger.cast("spam", "ep1", 10);
    ledger.cast("a", "ep1", 5);

    assert_eq!(ledger.live["ep1"].voter_count, 1);
    assert_eq!(ledger.batch("ep1").voter_count, 1);
}

#[test]
fn under_sampled_episode_is_pulled_to_global_mean() {
    // 20 unique voters: ten 9-star votes for X, one 10-star vote for Y
    let (prior, scored) = normalize(vec![stats("x", &[9; 10]), stats("y", &[10])], 20);

    assert_eq!(prior.min_votes, 2);
    assert_eq!(prior.strength, 10.0);
    assert!((prior.global_mean - 100.0 / 11.0).abs() < 1e-9);

    let x = scored.iter().find(|s| s.stats.episode_id == "x").unwrap();
    let y = scored.iter().find(|s| s.stats.episode_id == "y").unwrap();
    assert_eq!(x.dynamic_strength, 10.0);
    assert_eq!(y.dynamic_strength, 10.5);
    assert!((y.bayes_score - prior.global_mean).abs() < (10.0 - prior.global_mean));

    let chart = build_chart(scored);
    assert_eq!(chart[0].episode.stats.episode_id, "x");
    assert_eq!(chart[0].rank, 1);
    assert_eq!(chart[1].episode.stats.episode_id, "y");
    assert_eq!(chart[1].rank, 2);
}

#[test]
fn more_votes_toward_min_votes_lower_the_pull() {
    let prior = Prior::from_stats(&[], 200);
    assert_eq!(prior.min_votes, 20);

    let mut previous_strength = f64::INFINITY;
    let mut previous_gap = f64::INFINITY;
    for voter_count in [1, 5, 10, 15, 19] {
        let scores = vec![10; voter_count];
        let episode = stats("e", &scores);
        let strength = prior.dynamic_strength(episode.voter_count);
        let gap = (prior.score(&episode) - episode.mean()).abs();

        assert!(strength < previous_strength);
        assert!(gap < previous_gap);
        previous_strength = strength;
        previous_gap = gap;
    }
}

fn scored(id: &str, voter_count: u32, mean: f64, bayes_score: f64) -> ScoredEpisode {
    ScoredEpisode {
        stats: EpisodeStats {
            episode_id: id.to_string(),
            content_item_id: format!("title-{id}"),
            voter_count,
            weighted_sum: (mean * f64::from(voter_count)).round() as u64,
        },
        dynamic_strength: 10.0,
        bayes_score,
    }
}

#[test]
fn tied_episodes_share_rank_and_others_are_strictly_ordered() {
    let chart = build_chart(vec![
        scored("a", 50, 8.0, 8.40),
        scored("b", 50, 8.0, 8.42),
        scored("c", 50, 7.0, 7.50),
        scored("d", 80, 7.0, 7.10),
        scored("e", 50, 7.0, 7.12),
    ]);

    for i in 0..chart.len() {
        for j in (i + 1)..chart.len() {
            let (left, right) = (&chart[i], &chart[j]);
            if compare(&left.episode, &right.episode) == std::cmp::Ordering::Equal {
                assert_eq!(left.rank, right.rank);
            } else {
                assert!(left.rank < right.rank);
            }
        }
    }
}

#[test]
fn group_rank_is_one_plus_items_placed_before() {
    let chart = build_chart(vec![
        scored("a", 100, 9.0, 9.0),
        scored("b", 100, 9.0, 9.0),
        scored("c", 100, 9.0, 9.01),
        scored("d", 100, 8.0, 8.0),
        scored("e", 100, 7.0, 7.0),
        scored("f", 100, 7.0, 7.01),
    ]);

    let ranks: Vec<u32> = chart.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 1, 1, 4, 5, 5]);
}

#[test]
fn history_carries_across_three_weeks() {
    let week = |d: u32| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();

    let first = ranking::merge(4, None, HistoryFields::default(), week(2), 10);
    assert_eq!(first.rank_delta, None);
    assert_eq!(first.medal_tier, MedalTier::Bronze);

    let second = ranking::merge(
        1,
        Some(ranking::PreviousPlacement {
            rank: 4,
            consecutive_weeks_at_rank: first.consecutive_weeks_at_rank,
        }),
        first.history,
        week(9),
        10,
    );
    assert_eq!(second.rank_delta, Some(3));
    assert_eq!(second.medal_tier, MedalTier::Gold);

    let third = ranking::merge(
        1,
        Some(ranking::PreviousPlacement {
            rank: 1,
            consecutive_weeks_at_rank: second.consecutive_weeks_at_rank,
        }),
        second.history,
        week(16),
        10,
    );
    assert_eq!(third.consecutive_weeks_at_rank, 2);
    assert_eq!(third.history.debut_rank, Some(4));
    assert_eq!(third.history.debut_date, Some(week(2)));
    assert_eq!(third.history.peak_rank, Some(1));
    assert_eq!(third.history.peak_date, Some(week(9)));
    assert_eq!(third.history.weeks_on_top, 3);
}
