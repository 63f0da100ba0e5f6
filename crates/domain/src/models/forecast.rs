//! Forecast ingestion models.

use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use super::weather_entry::{
    truncate_chars, EntrySource, NewWeatherEntry, MAX_DESCRIPTION_LENGTH,
};

/// One point of an upstream forecast, already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
}

impl ForecastPoint {
    /// Converts the point into an API-sourced entry labelled with `city`.
    ///
    /// Upstream descriptions are not length-bounded; longer ones are cut
    /// to [`MAX_DESCRIPTION_LENGTH`] characters.
    pub fn into_new_entry(self, city: &str) -> NewWeatherEntry {
        NewWeatherEntry {
            timestamp: self.timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            description: truncate_chars(self.description, MAX_DESCRIPTION_LENGTH),
            city: Some(city.to_string()),
            source: EntrySource::Api,
        }
    }
}

/// Request payload for fetching a forecast. Omitted fields fall back to
/// configured defaults.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct FetchForecastRequest {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    #[validate(
        length(min = 1, max = 100, message = "City must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub city: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_units"))]
    pub units: Option<String>,
}
