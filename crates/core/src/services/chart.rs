//! Chart service: weekly close, recompute and chart queries.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use crate::{
    aggregate::{EpisodeAggregate, StarScore},
    ledger,
    ranking::{self, EpisodeStats, HistoryFields, PreviousPlacement},
};
use anichart_common::{AppError, AppResult, ChartConfig, IdGenerator};
use anichart_db::{
    entities::{content_item, rank_snapshot, shadow_ban, voting_period},
    repositories::{
        ContentItemRepository, EpisodeRepository, RankSnapshotRepository, ShadowBanRepository,
        StarVoteRepository, SubmissionRepository, VotingPeriodRepository,
    },
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, DatabaseTransaction, Set, TransactionTrait};
use serde::Serialize;

/// Snapshots returned by the rank history query.
const HISTORY_LIMIT: u64 = 52;

/// A period with its chart rows in rank order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodChart {
    /// The voting period.
    pub period: voting_period::Model,
    /// Chart rows.
    pub rows: Vec<rank_snapshot::Model>,
}

/// Rank history of a content item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankHistory {
    /// Content item with its debut and peak fields.
    pub content: content_item::Model,
    /// Most recent chart rows, newest first.
    pub recent: Vec<rank_snapshot::Model>,
}

/// Aggregate of one episode after a batch rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputedEpisode {
    /// Episode id.
    pub episode_id: String,
    /// Owning content item id.
    pub content_item_id: String,
    /// Rebuilt aggregate.
    pub aggregate: EpisodeAggregate,
}

/// Outcome of a suppression or restore action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionReport {
    /// Period the action applied to.
    pub period_id: String,
    /// Submissions whose `blocked` flag flipped.
    pub submissions_changed: u64,
    /// Rebuilt aggregates.
    pub episodes: Vec<RecomputedEpisode>,
}

/// Chart service for business logic.
#[derive(Clone)]
pub struct ChartService {
    db: Arc<DatabaseConnection>,
    content_repo: ContentItemRepository,
    episode_repo: EpisodeRepository,
    period_repo: VotingPeriodRepository,
    submission_repo: SubmissionRepository,
    vote_repo: StarVoteRepository,
    ban_repo: ShadowBanRepository,
    snapshot_repo: RankSnapshotRepository,
    config: ChartConfig,
    network_hash_salt: String,
    in_flight: PeriodLocks,
    id_gen: IdGenerator,
}

impl ChartService {
    /// Create a new chart service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: ChartConfig, network_hash_salt: String) -> Self {
        Self {
            content_repo: ContentItemRepository::new(Arc::clone(&db)),
            episode_repo: EpisodeRepository::new(Arc::clone(&db)),
            period_repo: VotingPeriodRepository::new(Arc::clone(&db)),
            submission_repo: SubmissionRepository::new(Arc::clone(&db)),
            vote_repo: StarVoteRepository::new(Arc::clone(&db)),
            ban_repo: ShadowBanRepository::new(Arc::clone(&db)),
            snapshot_repo: RankSnapshotRepository::new(Arc::clone(&db)),
            db,
            config,
            network_hash_salt,
            in_flight: PeriodLocks::default(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Recompute, normalize, rank and merge history for a period, as one transaction.
    ///
    /// A period that is already closed returns its stored chart unchanged. The
    /// previous period must already be closed.
    pub async fn run_weekly_close(&self, period_id: &str) -> AppResult<PeriodChart> {
        let _guard = self.in_flight.claim(period_id)?;

        let txn = self.begin().await?;
        let period = self.period_repo.get_by_id_on(&txn, period_id).await?;

        if period.closed_at.is_some()
            || self.snapshot_repo.exists_for_period(&txn, &period.id).await?
        {
            let rows = self.snapshot_repo.find_by_period(&txn, &period.id).await?;
            tracing::debug!(period_id = %period.id, "Chart already published");
            return Ok(PeriodChart { period, rows });
        }

        let previous = self.previous_placements(&txn, &period).await?;

        let recomputed = self.recompute(&txn, &period).await?;
        let unique_voters = self.submission_repo.count_unblocked(&txn, &period.id).await?;
        let unique_voters = u32::try_from(unique_voters)
            .map_err(|_| AppError::InconsistentAggregate("voter count overflow".to_string()))?;

        let stats = recomputed
            .iter()
            .map(|r| EpisodeStats::new(&r.episode_id, &r.content_item_id, &r.aggregate))
            .collect();
        let (prior, scored) = ranking::normalize(stats, unique_voters);
        let chart = ranking::build_chart(scored);

        let content_ids: Vec<String> = chart
            .iter()
            .map(|e| e.episode.stats.content_item_id.clone())
            .collect();
        let contents: HashMap<String, content_item::Model> = self
            .content_repo
            .find_by_ids(&txn, &content_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let total_score: f64 = chart.iter().map(|e| e.episode.bayes_score).sum();
        let chart_date = period.start_at.date_naive();
        let now = Utc::now();

        let mut rows = Vec::with_capacity(chart.len());
        for entry in &chart {
            let stats = &entry.episode.stats;
            let content = contents.get(&stats.content_item_id).ok_or_else(|| {
                AppError::NotFound(format!("Content item not found: {}", stats.content_item_id))
            })?;

            let merged = ranking::merge(
                entry.rank,
                previous.get(&stats.content_item_id).copied(),
                history_fields(content),
                chart_date,
                self.config.top_n,
            );

            let mut active: content_item::ActiveModel = content.clone().into();
            active.debut_rank = Set(merged.history.debut_rank.map(|r| r as i32));
            active.debut_date = Set(merged.history.debut_date);
            active.peak_rank = Set(merged.history.peak_rank.map(|r| r as i32));
            active.peak_date = Set(merged.history.peak_date);
            active.weeks_on_top = Set(merged.history.weeks_on_top as i32);
            self.content_repo.update_history(&txn, active).await?;

            rows.push(rank_snapshot::Model {
                id: self.id_gen.generate(),
                period_id: period.id.clone(),
                content_item_id: stats.content_item_id.clone(),
                episode_id: stats.episode_id.clone(),
                rank: entry.rank as i32,
                rank_delta: merged.rank_delta,
                consecutive_weeks_at_rank: merged.consecutive_weeks_at_rank as i32,
                vote_percent: if total_score > 0.0 {
                    entry.episode.bayes_score / total_score * 100.0
                } else {
                    0.0
                },
                bayes_score: entry.episode.bayes_score,
                voter_count: stats.voter_count as i32,
                medal_tier: merged.medal_tier,
                created_at: now.into(),
            });
        }

        self.snapshot_repo
            .insert_chart(&txn, rows.iter().map(snapshot_row).collect())
            .await?;
        self.period_repo
            .mark_closed(&txn, &period.id, now.into())
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            period_id = %period.id,
            charted = rows.len(),
            unique_voters = prior.unique_voters,
            min_votes = prior.min_votes,
            global_mean = prior.global_mean,
            strength = prior.strength,
            "Weekly chart published"
        );

        let period = voting_period::Model {
            closed_at: Some(now.into()),
            ..period
        };
        Ok(PeriodChart { period, rows })
    }

    /// Rebuild every episode aggregate of a period from eligible votes.
    pub async fn force_recompute(&self, period_id: &str) -> AppResult<Vec<RecomputedEpisode>> {
        let _guard = self.in_flight.claim(period_id)?;

        let txn = self.begin().await?;
        let period = self.period_repo.get_by_id_on(&txn, period_id).await?;
        let recomputed = self.recompute(&txn, &period).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(period_id = %period.id, episodes = recomputed.len(), "Aggregates recomputed");
        Ok(recomputed)
    }

    /// Ban a network and suppress its submissions in a period.
    pub async fn suppress_network(
        &self,
        period_id: &str,
        network: &str,
        reason: Option<String>,
    ) -> AppResult<SuppressionReport> {
        let network_hash = ledger::hash_network(network, &self.network_hash_salt);

        if self.ban_repo.find_by_hash(&network_hash).await?.is_none() {
            self.ban_repo
                .create(shadow_ban::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    network_hash: Set(network_hash.clone()),
                    reason: Set(reason),
                    created_at: Set(Utc::now().into()),
                })
                .await?;
        }

        self.set_suppressed(period_id, &network_hash, true).await
    }

    /// Lift a network ban and restore its submissions in a period.
    pub async fn restore_network(
        &self,
        period_id: &str,
        network: &str,
    ) -> AppResult<SuppressionReport> {
        let network_hash = ledger::hash_network(network, &self.network_hash_salt);
        self.ban_repo.delete_by_hash(&network_hash).await?;
        self.set_suppressed(period_id, &network_hash, false).await
    }

    /// Published chart of a period.
    pub async fn chart(&self, period_id: &str) -> AppResult<PeriodChart> {
        let period = self.period_repo.get_by_id(period_id).await?;
        if period.closed_at.is_none() {
            return Err(AppError::NotFound(format!(
                "No chart published for period: {period_id}"
            )));
        }

        let rows = self.snapshot_repo.find_chart(&period.id).await?;
        Ok(PeriodChart { period, rows })
    }

    /// Chart of the most recently closed period.
    pub async fn latest_chart(&self) -> AppResult<PeriodChart> {
        let period = self
            .period_repo
            .find_latest_closed()
            .await?
            .ok_or_else(|| AppError::NotFound("No chart published yet".to_string()))?;

        let rows = self.snapshot_repo.find_chart(&period.id).await?;
        Ok(PeriodChart { period, rows })
    }

    /// Debut, peak and recent placements of a content item.
    pub async fn rank_history(&self, content_item_id: &str) -> AppResult<RankHistory> {
        let content = self.content_repo.get_by_id(content_item_id).await?;
        let recent = self
            .snapshot_repo
            .find_by_content_item(content_item_id, HISTORY_LIMIT)
            .await?;
        Ok(RankHistory { content, recent })
    }

    /// Close every period whose grace time has passed, oldest first.
    ///
    /// Stops at the first failure so later periods never merge against a
    /// missing chart.
    pub async fn close_due_periods(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let cutoff = now - Duration::hours(self.config.close_grace_hours);
        let due = self.period_repo.find_due(cutoff.into()).await?;

        for period in &due {
            self.run_weekly_close(&period.id).await?;
        }
        Ok(due.len())
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_suppressed(
        &self,
        period_id: &str,
        network_hash: &str,
        blocked: bool,
    ) -> AppResult<SuppressionReport> {
        let _guard = self.in_flight.claim(period_id)?;

        let txn = self.begin().await?;
        let period = self.period_repo.get_by_id_on(&txn, period_id).await?;
        let submissions_changed = self
            .submission_repo
            .set_blocked_by_network(&txn, &period.id, network_hash, blocked)
            .await?;
        let episodes = self.recompute(&txn, &period).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            period_id = %period.id,
            blocked,
            submissions_changed,
            "Network suppression updated"
        );

        Ok(SuppressionReport {
            period_id: period.id,
            submissions_changed,
            episodes,
        })
    }

    /// Placements of the previous period's chart by content item.
    async fn previous_placements(
        &self,
        txn: &DatabaseTransaction,
        period: &voting_period::Model,
    ) -> AppResult<HashMap<String, PreviousPlacement>> {
        let Some(prev) = self.period_repo.find_previous(txn, period).await? else {
            return Ok(HashMap::new());
        };
        if prev.closed_at.is_none() {
            return Err(AppError::Conflict(format!(
                "previous period {} has no chart yet",
                prev.id
            )));
        }

        let placements = self
            .snapshot_repo
            .find_by_period(txn, &prev.id)
            .await?
            .into_iter()
            .map(|row| {
                let placement = PreviousPlacement {
                    rank: row.rank as u32,
                    consecutive_weeks_at_rank: row.consecutive_weeks_at_rank as u32,
                };
                (row.content_item_id, placement)
            })
            .collect();
        Ok(placements)
    }

    /// Batch rebuild: discard live aggregates and count eligible votes again.
    ///
    /// Episode rows are locked before votes are read; concurrent casts wait
    /// for the rebuild.
    async fn recompute(
        &self,
        txn: &DatabaseTransaction,
        period: &voting_period::Model,
    ) -> AppResult<Vec<RecomputedEpisode>> {
        let episodes = self
            .episode_repo
            .find_aired_between(txn, period.start_at, period.end_at)
            .await?;

        let mut scores: HashMap<String, Vec<StarScore>> = HashMap::new();
        for vote in self.vote_repo.find_eligible_in_period(txn, &period.id).await? {
            let Some(raw) = vote.score else { continue };
            let score = StarScore::new(raw).map_err(|_| {
                AppError::InconsistentAggregate(format!("vote {} holds score {raw}", vote.id))
            })?;
            scores.entry(vote.episode_id).or_default().push(score);
        }

        let recomputed = episodes
            .into_iter()
            .map(|episode| {
                let aggregate =
                    EpisodeAggregate::from_scores(scores.remove(&episode.id).unwrap_or_default());
                aggregate.check()?;
                Ok(RecomputedEpisode {
                    episode_id: episode.id,
                    content_item_id: episode.content_item_id,
                    aggregate,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        if let Some(stray) = scores.keys().next() {
            return Err(AppError::InconsistentAggregate(format!(
                "period {} holds votes for episode {stray} aired outside it",
                period.id
            )));
        }

        for episode in &recomputed {
            let (voter_count, histogram, weighted_sum) = episode.aggregate.to_columns()?;
            self.episode_repo
                .write_aggregate(txn, &episode.episode_id, voter_count, histogram, weighted_sum)
                .await?;
        }

        Ok(recomputed)
    }
}

fn history_fields(content: &content_item::Model) -> HistoryFields {
    HistoryFields {
        debut_rank: content.debut_rank.map(|r| r as u32),
        debut_date: content.debut_date,
        peak_rank: content.peak_rank.map(|r| r as u32),
        peak_date: content.peak_date,
        weeks_on_top: content.weeks_on_top as u32,
    }
}

fn snapshot_row(model: &rank_snapshot::Model) -> rank_snapshot::ActiveModel {
    rank_snapshot::ActiveModel {
        id: Set(model.id.clone()),
        period_id: Set(model.period_id.clone()),
        content_item_id: Set(model.content_item_id.clone()),
        episode_id: Set(model.episode_id.clone()),
        rank: Set(model.rank),
        rank_delta: Set(model.rank_delta),
        consecutive_weeks_at_rank: Set(model.consecutive_weeks_at_rank),
        vote_percent: Set(model.vote_percent),
        bayes_score: Set(model.bayes_score),
        voter_count: Set(model.voter_count),
        medal_tier: Set(model.medal_tier),
        created_at: Set(model.created_at),
    }
}

/// Periods with a batch job in progress.
#[derive(Clone, Default)]
struct PeriodLocks(Arc<Mutex<HashSet<String>>>);

impl PeriodLocks {
    fn claim(&self, period_id: &str) -> AppResult<PeriodGuard> {
        let mut running = self
            .0
            .lock()
            .map_err(|_| AppError::Internal("period lock poisoned".to_string()))?;

        if !running.insert(period_id.to_string()) {
            return Err(AppError::Conflict(format!(
                "A batch job is already running for period {period_id}"
            )));
        }

        Ok(PeriodGuard {
            locks: Arc::clone(&self.0),
            period_id: period_id.to_string(),
        })
    }
}

struct PeriodGuard {
    locks: Arc<Mutex<HashSet<String>>>,
    period_id: String,
}

impl Drop for PeriodGuard {
    fn drop(&mut self) {
        if let Ok(mut running) = self.locks.lock() {
            running.remove(&self.period_id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anichart_db::entities::{episode, rank_snapshot::MedalTier, star_vote};
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn create_test_period(id: &str, closed: bool) -> voting_period::Model {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        voting_period::Model {
            id: id.to_string(),
            start_at: start.into(),
            end_at: (start + Duration::days(7)).into(),
            closed_at: closed.then(|| (start + Duration::days(9)).into()),
            created_at: start.into(),
        }
    }

    fn create_test_episode(id: &str, content_item_id: &str) -> episode::Model {
        let aired = Utc.with_ymd_and_hms(2025, 6, 3, 15, 0, 0).unwrap();
        episode::Model {
            id: id.to_string(),
            content_item_id: content_item_id.to_string(),
            number: 1,
            aired_at: aired.into(),
            is_break: false,
            // Stale live aggregate, discarded by the rebuild.
            voter_count: 99,
            histogram: json!([0, 0, 0, 0, 0, 0, 0, 0, 0, 99]),
            weighted_sum: 990,
            created_at: aired.into(),
        }
    }

    fn create_test_vote(id: &str, episode_id: &str, score: i32) -> star_vote::Model {
        star_vote::Model {
            id: id.to_string(),
            submission_id: format!("sub-{id}"),
            episode_id: episode_id.to_string(),
            score: Some(score),
            late_participation: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_content(id: &str) -> content_item::Model {
        content_item::Model {
            id: id.to_string(),
            title: format!("Title {id}"),
            debut_rank: None,
            debut_date: None,
            peak_rank: None,
            peak_date: None,
            weeks_on_top: 0,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_row(period_id: &str, content_item_id: &str, rank: i32) -> rank_snapshot::Model {
        rank_snapshot::Model {
            id: format!("{period_id}-{content_item_id}"),
            period_id: period_id.to_string(),
            content_item_id: content_item_id.to_string(),
            episode_id: "ep-old".to_string(),
            rank,
            rank_delta: None,
            consecutive_weeks_at_rank: 3,
            vote_percent: 50.0,
            bayes_score: 8.0,
            voter_count: 12,
            medal_tier: MedalTier::Silver,
            created_at: Utc::now().into(),
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn exec_rows(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: MockDatabase) -> ChartService {
        ChartService::new(
            Arc::new(db.into_connection()),
            ChartConfig::default(),
            "salt".to_string(),
        )
    }

    #[test]
    fn test_period_locks_single_flight() {
        let locks = PeriodLocks::default();

        let guard = locks.claim("w1").unwrap();
        assert!(matches!(locks.claim("w1"), Err(AppError::Conflict(_))));
        assert!(locks.claim("w2").is_ok());

        drop(guard);
        assert!(locks.claim("w1").is_ok());
    }

    #[tokio::test]
    async fn test_chart_of_open_period_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_period("w1", false)]]),
        );

        let result = service.chart("w1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_latest_chart_without_closed_period() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<voting_period::Model>::new()]),
        );

        let result = service.latest_chart().await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_weekly_close_unknown_period() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<voting_period::Model>::new()]),
        );

        let result = service.run_weekly_close("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_close_due_periods_none_due() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<voting_period::Model>::new()]),
        );

        let closed = service.close_due_periods(Utc::now()).await.unwrap();

        assert_eq!(closed, 0);
    }

    #[test]
    fn test_history_fields_from_content() {
        let content = content_item::Model {
            id: "title".to_string(),
            title: "Sample".to_string(),
            debut_rank: Some(4),
            debut_date: None,
            peak_rank: Some(2),
            peak_date: None,
            weeks_on_top: 3,
            created_at: Utc::now().into(),
        };

        let fields = history_fields(&content);

        assert_eq!(fields.debut_rank, Some(4));
        assert_eq!(fields.peak_rank, Some(2));
        assert_eq!(fields.weeks_on_top, 3);
    }

    #[tokio::test]
    async fn test_weekly_close_waits_for_previous_chart() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_period("w2", false)]])
                .append_query_results([[count_row(0)]])
                .append_query_results([[create_test_period("w1", false)]]),
        );

        let result = service.run_weekly_close("w2").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_weekly_close_of_closed_period_returns_stored_chart() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_period("w1", true)]])
                .append_query_results([[create_test_row("w1", "title-a", 1)]]),
        );

        let chart = service.run_weekly_close("w1").await.unwrap();

        assert_eq!(chart.rows.len(), 1);
        assert_eq!(chart.rows[0].content_item_id, "title-a");
    }

    #[tokio::test]
    async fn test_weekly_close_publishes_chart_and_history() {
        let mut votes: Vec<star_vote::Model> = (0..10)
            .map(|i| create_test_vote(&format!("va{i}"), "ep-a", 9))
            .collect();
        votes.push(create_test_vote("vb0", "ep-b", 4));

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_period("w2", false)]])
                .append_query_results([[count_row(0)]])
                .append_query_results([[create_test_period("w1", true)]])
                .append_query_results([[create_test_row("w1", "title-a", 2)]])
                .append_query_results([[
                    create_test_episode("ep-a", "title-a"),
                    create_test_episode("ep-b", "title-b"),
                ]])
                .append_query_results([votes])
                .append_query_results([[count_row(20)]])
                .append_query_results([[create_test_content("title-a"), create_test_content("title-b")]])
                .append_query_results([[create_test_content("title-a")]])
                .append_query_results([[create_test_content("title-b")]])
                .append_exec_results([exec_rows(1), exec_rows(1), exec_rows(2), exec_rows(1)]),
        );

        let chart = service.run_weekly_close("w2").await.unwrap();

        assert!(chart.period.closed_at.is_some());
        assert_eq!(chart.rows.len(), 2);

        let first = &chart.rows[0];
        assert_eq!(first.content_item_id, "title-a");
        assert_eq!(first.episode_id, "ep-a");
        assert_eq!(first.rank, 1);
        assert_eq!(first.rank_delta, Some(1));
        assert_eq!(first.consecutive_weeks_at_rank, 1);
        assert_eq!(first.medal_tier, MedalTier::Gold);
        assert_eq!(first.voter_count, 10);

        let second = &chart.rows[1];
        assert_eq!(second.content_item_id, "title-b");
        assert_eq!(second.rank, 2);
        assert_eq!(second.rank_delta, None);
        assert_eq!(second.medal_tier, MedalTier::Silver);

        let percent: f64 = chart.rows.iter().map(|r| r.vote_percent).sum();
        assert!((percent - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_force_recompute_discards_stale_aggregate() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_period("w1", false)]])
                .append_query_results([[create_test_episode("ep-a", "title-a")]])
                .append_query_results([[
                    create_test_vote("v1", "ep-a", 7),
                    create_test_vote("v2", "ep-a", 8),
                ]])
                .append_exec_results([exec_rows(1)]),
        );

        let recomputed = service.force_recompute("w1").await.unwrap();

        assert_eq!(recomputed.len(), 1);
        let aggregate = &recomputed[0].aggregate;
        assert_eq!(aggregate.voter_count, 2);
        assert_eq!(aggregate.weighted_sum, 15);
        assert_eq!(aggregate.histogram[6], 1);
        assert_eq!(aggregate.histogram[7], 1);
        assert_eq!(aggregate.histogram[9], 0);
    }

    #[tokio::test]
    async fn test_recompute_rejects_votes_outside_period() {
        // No exec result queued: nothing may be written before the check.
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_period("w1", false)]])
                .append_query_results([[create_test_episode("ep-a", "title-a")]])
                .append_query_results([[
                    create_test_vote("v1", "ep-a", 7),
                    create_test_vote("v2", "ep-stray", 8),
                ]]),
        );

        let result = service.force_recompute("w1").await;

        assert!(matches!(result, Err(AppError::InconsistentAggregate(_))));
    }
}
