//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod alert_threshold;
pub mod weather_entry;

pub use alert_threshold::AlertThresholdEntity;
pub use weather_entry::{EntrySourceDb, WeatherEntryEntity};
