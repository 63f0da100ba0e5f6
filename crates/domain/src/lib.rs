//! Domain layer for the weather dashboard.
//!
//! This crate contains:
//! - Domain models (WeatherEntry, AlertThresholds, ForecastPoint)
//! - Request payload schemas and their coercion into domain values
//! - Store query filters and ingestion modes

pub mod models;
