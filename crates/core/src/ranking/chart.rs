//! Ordering and competition ranking of scored episodes.

use std::{cmp::Ordering, collections::HashSet};

use super::normalizer::ScoredEpisode;

/// Lower bound of the score tolerance.
pub const MIN_SCORE_EPSILON: f64 = 0.005;
/// Tolerance applied to raw star averages.
pub const MEAN_EPSILON: f64 = 0.005;

/// Score tolerance between two episodes with `a` and `b` votes.
#[must_use]
pub fn score_epsilon(a: u32, b: u32) -> f64 {
    let spread = 0.5 * (1.0 / f64::from(a.max(1)).sqrt() + 1.0 / f64::from(b.max(1)).sqrt());
    spread.max(MIN_SCORE_EPSILON)
}

/// Chart order of two episodes. `Less` means `a` places ahead of `b`,
/// `Equal` means they share a rank.
#[must_use]
pub fn compare(a: &ScoredEpisode, b: &ScoredEpisode) -> Ordering {
    let eps = score_epsilon(a.stats.voter_count, b.stats.voter_count);
    if (a.bayes_score - b.bayes_score).abs() >= eps {
        return b.bayes_score.total_cmp(&a.bayes_score);
    }

    match b.stats.voter_count.cmp(&a.stats.voter_count) {
        Ordering::Equal => {}
        ordering => return ordering,
    }

    let (mean_a, mean_b) = (a.stats.mean(), b.stats.mean());
    if (mean_a - mean_b).abs() >= MEAN_EPSILON {
        return mean_b.total_cmp(&mean_a);
    }

    Ordering::Equal
}

/// A placed chart row.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry {
    /// Competition rank, starting at 1.
    pub rank: u32,
    /// The episode the title is charted with.
    pub episode: ScoredEpisode,
}

/// Order episodes and assign competition ranks.
///
/// A title with several episodes is charted once, by its best-placed episode.
#[must_use]
pub fn build_chart(mut scored: Vec<ScoredEpisode>) -> Vec<ChartEntry> {
    // Deterministic starting order, then an insertion pass with the tolerant
    // comparator. `compare` is not transitive, so `sort_by` cannot be used.
    scored.sort_by(|a, b| {
        b.bayes_score
            .total_cmp(&a.bayes_score)
            .then_with(|| b.stats.voter_count.cmp(&a.stats.voter_count))
            .then_with(|| b.stats.mean().total_cmp(&a.stats.mean()))
            .then_with(|| a.stats.episode_id.cmp(&b.stats.episode_id))
    });

    // Drop repeat titles before ordering; removing rows afterwards could leave
    // neighbours the insertion pass never compared.
    let mut seen = HashSet::new();
    let mut charted: Vec<ScoredEpisode> = scored
        .into_iter()
        .filter(|e| seen.insert(e.stats.content_item_id.clone()))
        .collect();
    insertion_sort(&mut charted);

    let mut entries: Vec<ChartEntry> = Vec::with_capacity(charted.len());
    for (placed, episode) in charted.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(prev) if compare(&prev.episode, &episode) == Ordering::Equal => prev.rank,
            _ => placed as u32 + 1,
        };
        entries.push(ChartEntry { rank, episode });
    }
    entries
}

fn insertion_sort(items: &mut [ScoredEpisode]) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::normalizer::EpisodeStats;

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

    fn ranks(entries: &[ChartEntry]) -> Vec<(String, u32)> {
        entries
            .iter()
            .map(|e| (e.episode.stats.episode_id.clone(), e.rank))
            .collect()
    }

    #[test]
    fn test_score_epsilon() {
        assert!((score_epsilon(1, 1) - 1.0).abs() < 1e-12);
        assert!((score_epsilon(100, 100) - 0.1).abs() < 1e-12);
        assert_eq!(score_epsilon(u32::MAX, u32::MAX), MIN_SCORE_EPSILON);
    }

    #[test]
    fn test_clear_score_gap_orders_by_score() {
        let a = scored("a", 400, 8.0, 8.0);
        let b = scored("b", 900, 7.0, 7.5);

        assert_eq!(compare(&a, &b), Ordering::Less);
        assert_eq!(compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_near_tie_falls_back_to_voter_count() {
        // eps(100, 400) = 0.075
        let a = scored("a", 100, 8.0, 8.05);
        let b = scored("b", 400, 8.0, 8.0);

        assert_eq!(compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_near_tie_falls_back_to_mean() {
        let a = scored("a", 100, 7.0, 8.0);
        let b = scored("b", 100, 8.0, 8.02);

        assert_eq!(compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_true_tie() {
        let a = scored("a", 100, 8.0, 8.0);
        let b = scored("b", 100, 8.0, 8.02);

        assert_eq!(compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_competition_ranks() {
        let chart = build_chart(vec![
            scored("f", 100, 5.0, 5.0),
            scored("b", 100, 9.0, 9.01),
            scored("a", 100, 9.0, 9.0),
            scored("c", 100, 8.0, 8.0),
            scored("e", 100, 7.0, 7.0),
            scored("d", 100, 7.0, 7.02),
        ]);

        assert_eq!(
            ranks(&chart),
            vec![
                ("b".to_string(), 1),
                ("a".to_string(), 1),
                ("c".to_string(), 3),
                ("d".to_string(), 4),
                ("e".to_string(), 4),
                ("f".to_string(), 6),
            ]
        );
    }

    #[test]
    fn test_adjacent_entries_never_out_of_order() {
        let chart = build_chart(vec![
            scored("a", 1, 10.0, 9.2),
            scored("b", 30, 8.0, 8.9),
            scored("c", 4, 9.0, 8.95),
            scored("d", 200, 8.5, 8.6),
            scored("e", 2, 3.0, 7.9),
        ]);

        for pair in chart.windows(2) {
            assert_ne!(compare(&pair[0].episode, &pair[1].episode), Ordering::Greater);
            assert!(pair[0].rank <= pair[1].rank);
        }
    }

    #[test]
    fn test_title_charted_by_best_episode() {
        let mut second = scored("ep2", 100, 6.0, 6.0);
        second.stats.content_item_id = "title-ep1".to_string();

        let chart = build_chart(vec![second, scored("ep1", 100, 9.0, 9.0), scored("x", 100, 7.0, 7.0)]);

        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].episode.stats.episode_id, "ep1");
        assert_eq!(chart[1].episode.stats.episode_id, "x");
        assert_eq!(chart[1].rank, 2);
    }

    #[test]
    fn test_repeat_title_dropped_before_ordering() {
        // p beats q on score, q beats r on voter count, r beats p on voter count.
        let mut q = scored("q", 10_000, 8.0, 8.04);
        q.stats.content_item_id = "title-t0".to_string();

        let chart = build_chart(vec![
            scored("t0", 10_000, 9.5, 9.5),
            scored("p", 100, 8.0, 8.10),
            q,
            scored("r", 400, 8.0, 8.03),
        ]);

        let ids: Vec<&str> = chart
            .iter()
            .map(|e| e.episode.stats.episode_id.as_str())
            .collect();
        assert_eq!(ids, ["t0", "r", "p"]);
        for pair in chart.windows(2) {
            assert_ne!(compare(&pair[0].episode, &pair[1].episode), Ordering::Greater);
        }
    }

    #[test]
    fn test_empty_chart() {
        assert!(build_chart(Vec::new()).is_empty());
    }
}
