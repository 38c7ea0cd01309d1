//! Background jobs for anichart.
//!
//! - **Scheduler**: periodic check that publishes the weekly chart of every
//!   voting period whose grace time has passed
//! - **Executor**: [`JobExecutor`] implementation over the chart service

pub mod executor;
pub mod scheduler;

pub use executor::ChartJobExecutor;
pub use scheduler::{JobExecutor, ScheduledJob, SchedulerConfig, SchedulerState, run_job, run_scheduler};
