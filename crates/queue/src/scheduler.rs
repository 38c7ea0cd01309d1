//! Periodic jobs: closing voting periods once their grace time has passed.

use std::sync::Arc;
use std::time::Duration;

use anichart_common::ChartConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{sync::Mutex, task::JoinHandle, time::interval};

/// Scheduled job types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledJob {
    /// Publish charts of every period that is due.
    CloseDuePeriods,
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between due-period checks (default: 5 minutes).
    pub close_check_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            close_check_interval: Duration::from_secs(300),
        }
    }
}

impl From<&ChartConfig> for SchedulerConfig {
    fn from(config: &ChartConfig) -> Self {
        Self {
            close_check_interval: Duration::from_secs(config.check_interval_secs.max(1)),
        }
    }
}

/// Scheduler state for tracking job runs.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// When the last due-period check finished.
    pub last_close_check: Option<DateTime<Utc>>,
    /// Periods closed since start.
    pub periods_closed: u64,
    /// Failed checks since start.
    pub failures: u64,
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Close every period due at `now`, returning how many were closed.
    async fn close_due_periods(
        &self,
        now: DateTime<Utc>,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;
}

/// Run one due-period check and record it in `state`.
pub async fn run_job<E: JobExecutor + ?Sized>(
    job: ScheduledJob,
    executor: &E,
    state: &Mutex<SchedulerState>,
    now: DateTime<Utc>,
) {
    match job {
        ScheduledJob::CloseDuePeriods => {
            let result = executor.close_due_periods(now).await;
            let mut state = state.lock().await;
            state.last_close_check = Some(now);
            match result {
                Ok(count) => {
                    state.periods_closed += count as u64;
                    if count > 0 {
                        tracing::info!(count, "Closed due voting periods");
                    }
                }
                Err(e) => {
                    state.failures += 1;
                    tracing::error!(error = %e, "Failed to close due voting periods");
                }
            }
        }
    }
}

/// Run the scheduler with the given configuration and executor.
pub fn run_scheduler<E: JobExecutor + 'static>(
    config: SchedulerConfig,
    executor: Arc<E>,
    state: Arc<Mutex<SchedulerState>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(config.close_check_interval);
        loop {
            interval.tick().await;
            run_job(ScheduledJob::CloseDuePeriods, executor.as_ref(), &state, Utc::now()).await;
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeExecutor {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl JobExecutor for FakeExecutor {
        async fn close_due_periods(
            &self,
            _now: DateTime<Utc>,
        ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err("database unavailable".into())
            } else {
                Ok(2)
            }
        }
    }

    #[test]
    fn test_scheduler_config_from_chart_config() {
        let config = SchedulerConfig::from(&ChartConfig::default());
        assert_eq!(config.close_check_interval, Duration::from_secs(300));

        let zero = ChartConfig {
            check_interval_secs: 0,
            ..ChartConfig::default()
        };
        assert_eq!(
            SchedulerConfig::from(&zero).close_check_interval,
            Duration::from_secs(1)
        );
    }

    #[tokio::test]
    async fn test_run_job_records_success() {
        let executor = FakeExecutor {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let state = Mutex::new(SchedulerState::default());
        let now = Utc::now();

        run_job(ScheduledJob::CloseDuePeriods, &executor, &state, now).await;

        let state = state.lock().await;
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.periods_closed, 2);
        assert_eq!(state.last_close_check, Some(now));
        assert_eq!(state.failures, 0);
    }

    #[tokio::test]
    async fn test_run_job_records_failure() {
        let executor = FakeExecutor {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let state = Mutex::new(SchedulerState::default());

        run_job(ScheduledJob::CloseDuePeriods, &executor, &state, Utc::now()).await;

        let state = state.lock().await;
        assert_eq!(state.failures, 1);
        assert_eq!(state.periods_closed, 0);
    }
}
