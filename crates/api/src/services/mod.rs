//! Business services for the API layer.

pub mod dashboard;
pub mod forecast;

pub use dashboard::{DashboardError, DashboardRenderer, RenderedDashboard};
pub use forecast::{ForecastError, ForecastProvider, ForecastQuery, OpenWeatherMapClient};
