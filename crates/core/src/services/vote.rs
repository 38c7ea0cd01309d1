//! Vote service: casting, editing and withdrawing star votes.

use std::sync::Arc;

use crate::{
    aggregate::{EpisodeAggregate, ScoreChange, StarScore},
    ledger::{self, VoteState, VoterIdentity},
};
use anichart_common::{AppError, AppResult, IdGenerator, VotingConfig};
use anichart_db::{
    entities::{episode, star_vote, submission},
    repositories::{
        EpisodeRepository, ShadowBanRepository, StarVoteRepository, SubmissionRepository,
        VotingPeriodRepository,
    },
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, DatabaseTransaction, Set, TransactionTrait};
use serde::Serialize;

/// A caller of the voting endpoints.
#[derive(Debug, Clone)]
pub struct Voter {
    /// Member or anonymous identity.
    pub identity: VoterIdentity,
    /// Raw network identifier, hashed before use.
    pub network: Option<String>,
}

/// Input for casting or editing a vote.
#[derive(Debug, Clone)]
pub struct CastVoteInput {
    /// Star value, 1 to 10.
    pub score: i32,
    /// Existing vote to edit.
    pub vote_id: Option<String>,
    /// Comment accompanying a late vote.
    ///
    /// Comments are stored by the comment service; here only their presence
    /// gates the late path.
    pub comment: Option<String>,
}

/// Outcome of a vote write.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    /// The stored vote.
    pub vote: star_vote::Model,
    /// Episode aggregate after the write.
    pub aggregate: EpisodeAggregate,
    /// Whether the submission is suppressed and left the aggregate untouched.
    #[serde(skip)]
    pub suppressed: bool,
}

/// Current voting status of an episode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeStatus {
    /// The episode row.
    pub episode: episode::Model,
    /// Vote state at the time of the query.
    pub state: VoteState,
    /// Live aggregate.
    pub aggregate: EpisodeAggregate,
    /// Raw star average.
    pub mean: Option<f64>,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    db: Arc<DatabaseConnection>,
    episode_repo: EpisodeRepository,
    period_repo: VotingPeriodRepository,
    submission_repo: SubmissionRepository,
    vote_repo: StarVoteRepository,
    ban_repo: ShadowBanRepository,
    config: VotingConfig,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: VotingConfig) -> Self {
        Self {
            episode_repo: EpisodeRepository::new(Arc::clone(&db)),
            period_repo: VotingPeriodRepository::new(Arc::clone(&db)),
            submission_repo: SubmissionRepository::new(Arc::clone(&db)),
            vote_repo: StarVoteRepository::new(Arc::clone(&db)),
            ban_repo: ShadowBanRepository::new(Arc::clone(&db)),
            db,
            config,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a vote, or edit the caller's existing vote for the episode.
    pub async fn cast_or_update_vote(
        &self,
        episode_id: &str,
        voter: &Voter,
        input: CastVoteInput,
    ) -> AppResult<VoteReceipt> {
        let score = StarScore::new(input.score)?;

        let txn = self.begin().await?;
        let episode = self.episode_repo.get_for_update(&txn, episode_id).await?;

        let state = VoteState::at(
            episode.aired_at.to_utc(),
            episode.is_break,
            Utc::now(),
            &self.config,
        );
        let path = ledger::admit(state, &voter.identity, input.comment.as_deref())?;
        if path.is_late() {
            tracing::debug!(
                episode_id = %episode.id,
                comment_len = input.comment.as_deref().map_or(0, str::len),
                "Late vote admitted, comment left to the comment service"
            );
        }

        let period = self
            .period_repo
            .get_containing(&txn, episode.aired_at)
            .await?;
        let principal_key = voter.identity.principal_key(&period.id);

        let (submission, existing) = match input.vote_id.as_deref() {
            Some(vote_id) => {
                let (submission, vote) = self
                    .owned_vote(&txn, &episode.id, vote_id, &principal_key)
                    .await?;
                (submission, Some(vote))
            }
            None => {
                let submission = self
                    .resolve_submission(&txn, &period.id, &principal_key, voter)
                    .await?;
                let vote = self
                    .vote_repo
                    .find_by_submission_and_episode(&txn, &submission.id, &episode.id)
                    .await?;
                (submission, vote)
            }
        };

        let now = Utc::now();
        let (vote, old_score) = match existing {
            Some(vote) => {
                let old_score = vote.score.map(StarScore::new).transpose()?;
                let mut active: star_vote::ActiveModel = vote.into();
                active.score = Set(Some(score.value()));
                active.late_participation = Set(path.is_late());
                active.updated_at = Set(Some(now.into()));
                (self.vote_repo.update(&txn, active).await?, old_score)
            }
            None => {
                let model = star_vote::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    submission_id: Set(submission.id.clone()),
                    episode_id: Set(episode.id.clone()),
                    score: Set(Some(score.value())),
                    late_participation: Set(path.is_late()),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                };
                (self.vote_repo.create(&txn, model).await?, None)
            }
        };

        let aggregate = self
            .adjust_aggregate(
                &txn,
                &episode,
                &submission,
                ScoreChange::between(old_score, Some(score)),
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            episode_id = %episode.id,
            vote_id = %vote.id,
            late = path.is_late(),
            voter_count = aggregate.voter_count,
            "Vote recorded"
        );

        Ok(VoteReceipt {
            vote,
            aggregate,
            suppressed: submission.blocked,
        })
    }

    /// Withdraw a vote the caller owns.
    pub async fn withdraw_vote(
        &self,
        episode_id: &str,
        vote_id: &str,
        voter: &Voter,
    ) -> AppResult<VoteReceipt> {
        let txn = self.begin().await?;
        let episode = self.episode_repo.get_for_update(&txn, episode_id).await?;

        let state = VoteState::at(
            episode.aired_at.to_utc(),
            episode.is_break,
            Utc::now(),
            &self.config,
        );
        ledger::admit_withdrawal(state, &voter.identity)?;

        let period = self
            .period_repo
            .get_containing(&txn, episode.aired_at)
            .await?;
        let principal_key = voter.identity.principal_key(&period.id);
        let (submission, vote) = self
            .owned_vote(&txn, &episode.id, vote_id, &principal_key)
            .await?;

        let Some(old_score) = vote.score.map(StarScore::new).transpose()? else {
            return Err(AppError::NotFound(format!("Vote already withdrawn: {vote_id}")));
        };

        let mut active: star_vote::ActiveModel = vote.into();
        active.score = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        let vote = self.vote_repo.update(&txn, active).await?;

        let aggregate = self
            .adjust_aggregate(&txn, &episode, &submission, ScoreChange::Removed(old_score))
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            episode_id = %episode.id,
            vote_id = %vote.id,
            voter_count = aggregate.voter_count,
            "Vote withdrawn"
        );

        Ok(VoteReceipt {
            vote,
            aggregate,
            suppressed: submission.blocked,
        })
    }

    /// Voting status and live aggregate of an episode.
    pub async fn episode_status(&self, episode_id: &str) -> AppResult<EpisodeStatus> {
        let episode = self.episode_repo.get_by_id(episode_id).await?;
        let aggregate = EpisodeAggregate::from_model(&episode)?;
        let state = VoteState::at(
            episode.aired_at.to_utc(),
            episode.is_break,
            Utc::now(),
            &self.config,
        );

        Ok(EpisodeStatus {
            mean: aggregate.mean(),
            state,
            aggregate,
            episode,
        })
    }

    /// The caller's current vote for an episode, if any.
    pub async fn my_vote(
        &self,
        episode_id: &str,
        identity: &VoterIdentity,
    ) -> AppResult<Option<star_vote::Model>> {
        let episode = self.episode_repo.get_by_id(episode_id).await?;
        let period = self
            .period_repo
            .get_containing(self.db.as_ref(), episode.aired_at)
            .await?;

        let principal_key = identity.principal_key(&period.id);
        let Some(submission) = self
            .submission_repo
            .find_for_voter(&period.id, &principal_key)
            .await?
        else {
            return Ok(None);
        };

        self.vote_repo
            .find_for_episode(&submission.id, &episode.id)
            .await
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load a vote for editing, checking it belongs to the episode and the caller.
    async fn owned_vote(
        &self,
        txn: &DatabaseTransaction,
        episode_id: &str,
        vote_id: &str,
        principal_key: &str,
    ) -> AppResult<(submission::Model, star_vote::Model)> {
        let vote = self
            .vote_repo
            .find_by_id(txn, vote_id)
            .await?
            .filter(|v| v.episode_id == episode_id)
            .ok_or_else(|| AppError::NotFound(format!("Vote not found: {vote_id}")))?;

        let submission = self
            .submission_repo
            .find_by_id(txn, &vote.submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission not found: {}", vote.submission_id)))?;

        ledger::ensure_owner(&submission.principal_key, principal_key)?;
        Ok((submission, vote))
    }

    /// Find the caller's submission for the period, creating it on first vote.
    ///
    /// The ban list is consulted only here; the result is stamped on the row.
    async fn resolve_submission(
        &self,
        txn: &DatabaseTransaction,
        period_id: &str,
        principal_key: &str,
        voter: &Voter,
    ) -> AppResult<submission::Model> {
        if let Some(existing) = self
            .submission_repo
            .find_by_principal(txn, period_id, principal_key)
            .await?
        {
            return Ok(existing);
        }

        let network_hash = voter
            .network
            .as_deref()
            .map(|n| ledger::hash_network(n, &self.config.network_hash_salt));

        let blocked = match network_hash.as_deref() {
            Some(hash) => self.ban_repo.is_banned(hash).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ban lookup failed, treating as not banned");
                false
            }),
            None => false,
        };

        if blocked {
            tracing::debug!(period_id = %period_id, "Submission created suppressed");
        }

        let model = submission::ActiveModel {
            id: Set(self.id_gen.generate()),
            period_id: Set(period_id.to_string()),
            principal_key: Set(principal_key.to_string()),
            member_id: Set(voter.identity.member_id().map(str::to_string)),
            network_hash: Set(network_hash),
            blocked: Set(blocked),
            created_at: Set(Utc::now().into()),
        };
        self.submission_repo.create(txn, model).await
    }

    /// Apply a score change to the live aggregate unless the submission is suppressed.
    async fn adjust_aggregate(
        &self,
        txn: &DatabaseTransaction,
        episode: &episode::Model,
        submission: &submission::Model,
        change: ScoreChange,
    ) -> AppResult<EpisodeAggregate> {
        let mut aggregate = EpisodeAggregate::from_model(episode)?;
        if submission.blocked || change == ScoreChange::Unchanged {
            return Ok(aggregate);
        }

        aggregate.apply(change)?;
        let (voter_count, histogram, weighted_sum) = aggregate.to_columns()?;
        self.episode_repo
            .write_aggregate(txn, &episode.id, voter_count, histogram, weighted_sum)
            .await?;
        Ok(aggregate)
    }
}
