//! Job executor backed by the chart service.

use anichart_core::ChartService;
use chrono::{DateTime, Utc};

use crate::scheduler::JobExecutor;

/// Runs scheduled jobs against the database through [`ChartService`].
#[derive(Clone)]
pub struct ChartJobExecutor {
    chart_service: ChartService,
}

impl ChartJobExecutor {
    /// Create a new executor.
    #[must_use]
    pub const fn new(chart_service: ChartService) -> Self {
        Self { chart_service }
    }
}

#[async_trait::async_trait]
impl JobExecutor for ChartJobExecutor {
    async fn close_due_periods(
        &self,
        now: DateTime<Utc>,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.chart_service.close_due_periods(now).await?)
    }
}
