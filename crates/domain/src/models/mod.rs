//! Domain models for the weather dashboard.

pub mod alert;
pub mod forecast;
pub mod ingestion;
pub mod weather_entry;

pub use alert::{AlertThresholds, SetAlertsRequest};
pub use forecast::{FetchForecastRequest, ForecastPoint};
pub use ingestion::IngestionMode;
pub use weather_entry::{
    AddEntryRequest, EntryFilter, EntryInputError, EntrySource, ListEntriesQuery,
    NewWeatherEntry, WeatherEntry, WeatherEntryResponse, MANUAL_ENTRY_CITY, MAX_CITY_LENGTH,
    MAX_DESCRIPTION_LENGTH,
};
