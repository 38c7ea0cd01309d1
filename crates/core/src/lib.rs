//! Weekly ranking engine for anichart.
//!
//! Star votes flow through the [`ledger`] rules into per-episode
//! [`aggregate`]s; at week close the [`ranking`] pipeline smooths, orders and
//! merges them into the published chart. [`services`] run both sides against
//! the database.

pub mod aggregate;
pub mod ledger;
pub mod ranking;
pub mod services;

pub use aggregate::{EpisodeAggregate, ScoreChange, StarScore};
pub use ledger::{VoteState, VoterIdentity};
pub use services::*;
