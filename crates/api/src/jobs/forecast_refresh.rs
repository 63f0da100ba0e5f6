//! Periodic forecast refresh hook.
//!
//! Registered only when `jobs.forecast_refresh_enabled` is set. Each tick
//! logs and returns; forecasts are still loaded through `/fetch_api_data`.

use tracing::info;

use super::scheduler::{Job, JobFrequency};

/// Placeholder job for refetching forecasts on a schedule.
#[derive(Debug, Clone)]
pub struct ForecastRefreshJob {
    interval_hours: u64,
    city: String,
}

impl ForecastRefreshJob {
    pub fn new(interval_hours: u64, city: impl Into<String>) -> Self {
        Self {
            interval_hours: interval_hours.max(1),
            city: city.into(),
        }
    }
}

#[async_trait::async_trait]
impl Job for ForecastRefreshJob {
    fn name(&self) -> &'static str {
        "forecast_refresh"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hours(self.interval_hours)
    }

    async fn execute(&self) -> Result<(), String> {
        info!(city = %self.city, "Forecast refresh tick, nothing to fetch");
        Ok(())
    }
}
