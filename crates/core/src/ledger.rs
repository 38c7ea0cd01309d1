//! Submission ledger rules: vote states, identities and ownership.

use anichart_common::{AppError, AppResult, VotingConfig};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Whether an episode accepts votes right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteState {
    /// Not aired yet, or a broadcast break.
    Closed,
    /// Anyone may vote.
    VotingWindow,
    /// Only members leaving a comment may vote.
    LoginRequired,
    /// Results only.
    AlwaysOpen,
}

impl VoteState {
    /// State of an episode at `now`.
    #[must_use]
    pub fn at(
        aired_at: DateTime<Utc>,
        is_break: bool,
        now: DateTime<Utc>,
        config: &VotingConfig,
    ) -> Self {
        if is_break || now < aired_at {
            return Self::Closed;
        }

        let elapsed = now - aired_at;
        if elapsed < Duration::hours(config.open_window_hours) {
            Self::VotingWindow
        } else if elapsed < Duration::days(config.late_window_days) {
            Self::LoginRequired
        } else {
            Self::AlwaysOpen
        }
    }
}

/// How a vote got through the state check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotePath {
    /// Cast during the open window.
    Open,
    /// Cast by a commenting member after the open window.
    Late,
}

impl VotePath {
    /// Whether this vote is flagged as late participation.
    #[must_use]
    pub const fn is_late(self) -> bool {
        matches!(self, Self::Late)
    }
}

/// Who is voting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoterIdentity {
    /// Logged-in member.
    Member {
        /// Member id from the auth layer.
        member_id: String,
    },
    /// Anonymous voter recognised by cookie.
    Anonymous {
        /// Opaque cookie token.
        token: String,
    },
}

impl VoterIdentity {
    /// Member id, if authenticated.
    #[must_use]
    pub fn member_id(&self) -> Option<&str> {
        match self {
            Self::Member { member_id } => Some(member_id),
            Self::Anonymous { .. } => None,
        }
    }

    /// De-duplication key of this identity inside one period.
    ///
    /// Keys differ between periods and never contain the raw member id or token.
    #[must_use]
    pub fn principal_key(&self, period_id: &str) -> String {
        let (kind, subject) = match self {
            Self::Member { member_id } => ("member", member_id.as_str()),
            Self::Anonymous { token } => ("anon", token.as_str()),
        };

        let mut hasher = Sha256::new();
        hasher.update(period_id.as_bytes());
        hasher.update(b":");
        hasher.update(kind.as_bytes());
        hasher.update(b":");
        hasher.update(subject.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Salted hash of a network identifier, as stored and matched against bans.
#[must_use]
pub fn hash_network(network: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(network.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Check that a vote may be written in `state`.
pub fn admit(state: VoteState, identity: &VoterIdentity, comment: Option<&str>) -> AppResult<VotePath> {
    match state {
        VoteState::VotingWindow => Ok(VotePath::Open),
        VoteState::LoginRequired => {
            if identity.member_id().is_none() {
                return Err(AppError::VoteClosed(
                    "voting window has ended, log in to cast a late vote".to_string(),
                ));
            }
            if comment.is_none_or(|c| c.trim().is_empty()) {
                return Err(AppError::VoteClosed(
                    "late votes must come with a comment".to_string(),
                ));
            }
            Ok(VotePath::Late)
        }
        VoteState::Closed => Err(AppError::VoteClosed(
            "episode is not open for voting".to_string(),
        )),
        VoteState::AlwaysOpen => Err(AppError::VoteClosed(
            "voting for this episode has ended".to_string(),
        )),
    }
}

/// Check that a withdrawal may happen in `state`.
pub fn admit_withdrawal(state: VoteState, identity: &VoterIdentity) -> AppResult<()> {
    match state {
        VoteState::VotingWindow => Ok(()),
        VoteState::LoginRequired if identity.member_id().is_some() => Ok(()),
        _ => Err(AppError::VoteClosed(
            "votes for this episode can no longer be withdrawn".to_string(),
        )),
    }
}

/// Check that the caller owns the submission holding a vote.
pub fn ensure_owner(submission_key: &str, caller_key: &str) -> AppResult<()> {
    if submission_key == caller_key {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn aired() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 4, 22, 0, 0).unwrap()
    }

    fn member() -> VoterIdentity {
        VoterIdentity::Member {
            member_id: "alice".to_string(),
        }
    }

    fn anonymous() -> VoterIdentity {
        VoterIdentity::Anonymous {
            token: "cookie".to_string(),
        }
    }

    #[test]
    fn test_state_transitions() {
        let config = VotingConfig::default();
        let at = |hours: i64| VoteState::at(aired(), false, aired() + Duration::hours(hours), &config);

        assert_eq!(VoteState::at(aired(), false, aired() - Duration::minutes(1), &config), VoteState::Closed);
        assert_eq!(at(0), VoteState::VotingWindow);
        assert_eq!(at(35), VoteState::VotingWindow);
        assert_eq!(at(36), VoteState::LoginRequired);
        assert_eq!(at(24 * 7 - 1), VoteState::LoginRequired);
        assert_eq!(at(24 * 7), VoteState::AlwaysOpen);
    }

    #[test]
    fn test_break_never_opens() {
        let config = VotingConfig::default();
        let now = aired() + Duration::hours(1);

        assert_eq!(VoteState::at(aired(), true, now, &config), VoteState::Closed);
    }

    #[test]
    fn test_admit() {
        assert_eq!(admit(VoteState::VotingWindow, &anonymous(), None).unwrap(), VotePath::Open);
        assert_eq!(
            admit(VoteState::LoginRequired, &member(), Some("great fight scene")).unwrap(),
            VotePath::Late
        );
        assert!(matches!(
            admit(VoteState::LoginRequired, &member(), Some("   ")),
            Err(AppError::VoteClosed(_))
        ));
        assert!(matches!(
            admit(VoteState::LoginRequired, &anonymous(), Some("hi")),
            Err(AppError::VoteClosed(_))
        ));
        assert!(matches!(admit(VoteState::Closed, &member(), None), Err(AppError::VoteClosed(_))));
        assert!(matches!(admit(VoteState::AlwaysOpen, &member(), None), Err(AppError::VoteClosed(_))));
    }

    #[test]
    fn test_admit_withdrawal() {
        assert!(admit_withdrawal(VoteState::VotingWindow, &anonymous()).is_ok());
        assert!(admit_withdrawal(VoteState::LoginRequired, &member()).is_ok());
        assert!(admit_withdrawal(VoteState::LoginRequired, &anonymous()).is_err());
        assert!(admit_withdrawal(VoteState::AlwaysOpen, &member()).is_err());
    }

    #[test]
    fn test_principal_key() {
        let key = member().principal_key("w1");

        assert_eq!(key.len(), 64);
        assert_eq!(key, member().principal_key("w1"));
        assert_ne!(key, member().principal_key("w2"));
        assert!(!key.contains("alice"));

        let same_subject = VoterIdentity::Anonymous {
            token: "alice".to_string(),
        };
        assert_ne!(key, same_subject.principal_key("w1"));
    }

    #[test]
    fn test_hash_network() {
        assert_eq!(hash_network("10.0.0.1", "salt"), hash_network(" 10.0.0.1 ", "salt"));
        assert_ne!(hash_network("10.0.0.1", "salt"), hash_network("10.0.0.1", "pepper"));
    }

    #[test]
    fn test_ensure_owner() {
        assert!(ensure_owner("k", "k").is_ok());
        assert!(matches!(ensure_owner("k", "other"), Err(AppError::Unauthorized)));
    }
}
