//! Background job scheduler and job implementations.

mod forecast_refresh;
mod scheduler;

pub use forecast_refresh::ForecastRefreshJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
