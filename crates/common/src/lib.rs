//! Common utilities and shared types for anichart.
//!
//! This crate provides foundational components used across all anichart crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use anichart_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     println!("Voting window: {}h", config.voting.open_window_hours);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{ChartConfig, Config, VotingConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
