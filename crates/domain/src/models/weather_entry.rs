//! Weather entry domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::time::{format_timestamp, parse_timestamp, TimestampError};
use shared::validation::{coerce_or_zero, CoercionError, NumericInput};
use thiserror::Error;
use validator::Validate;

/// City label given to manual entries that do not name one.
pub const MANUAL_ENTRY_CITY: &str = "Manual Entry";

/// Longest description a store accepts, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// Longest city name a store accepts, in characters.
pub const MAX_CITY_LENGTH: usize = 100;

/// Cuts `value` down to at most `max` characters.
pub fn truncate_chars(mut value: String, max: usize) -> String {
    if let Some((byte_index, _)) = value.char_indices().nth(max) {
        value.truncate(byte_index);
    }
    value
}

/// Where an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    Manual,
    Api,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Manual => "manual",
            EntrySource::Api => "api",
        }
    }
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntrySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(EntrySource::Manual),
            "api" => Ok(EntrySource::Api),
            other => Err(format!("Unknown entry source: {}", other)),
        }
    }
}

/// A stored weather observation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherEntry {
    pub id: i64,
    pub owner_id: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
    pub city: Option<String>,
    pub source: EntrySource,
    pub created_at: DateTime<Utc>,
}

/// An observation that has been validated but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWeatherEntry {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
    pub city: Option<String>,
    pub source: EntrySource,
}

impl NewWeatherEntry {
    /// Attaches store-assigned identity to the observation.
    pub fn into_entry(self, id: i64, owner_id: &str, created_at: DateTime<Utc>) -> WeatherEntry {
        WeatherEntry {
            id,
            owner_id: owner_id.to_string(),
            timestamp: self.timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            description: self.description,
            city: self.city,
            source: self.source,
            created_at,
        }
    }
}

/// Errors raised while turning a payload into a [`NewWeatherEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryInputError {
    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

/// Request payload for adding a manual entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddEntryRequest {
    #[validate(custom(function = "shared::validation::validate_datetime"))]
    pub datetime: String,

    #[serde(default)]
    pub temperature: Option<NumericInput>,

    #[serde(default)]
    pub humidity: Option<NumericInput>,

    #[serde(default)]
    pub windspeed: Option<NumericInput>,

    #[serde(default)]
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "City must be at most 100 characters"))]
    pub city: Option<String>,
}

impl AddEntryRequest {
    /// Coerces the payload into a manual observation.
    ///
    /// Missing measurements become `0.0`; a missing city becomes
    /// [`MANUAL_ENTRY_CITY`] and a blank one is dropped.
    pub fn into_new_entry(self) -> Result<NewWeatherEntry, EntryInputError> {
        let timestamp = parse_timestamp(&self.datetime)?;
        let temperature = coerce_or_zero(self.temperature.as_ref(), "temperature")?;
        let humidity = coerce_or_zero(self.humidity.as_ref(), "humidity")?;
        let wind_speed = coerce_or_zero(self.windspeed.as_ref(), "windspeed")?;

        let city = match self.city {
            None => Some(MANUAL_ENTRY_CITY.to_string()),
            Some(c) if c.trim().is_empty() => None,
            Some(c) => Some(c.trim().to_string()),
        };

        Ok(NewWeatherEntry {
            timestamp,
            temperature,
            humidity,
            wind_speed,
            description: self.description.unwrap_or_default(),
            city,
            source: EntrySource::Manual,
        })
    }
}

/// Query-string filters for listing entries.
///
/// Empty strings are treated as absent, matching what an HTML form sends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEntriesQuery {
    pub city: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl ListEntriesQuery {
    pub fn into_filter(self) -> Result<EntryFilter, TimestampError> {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let date_from = non_empty(self.date_from)
            .map(|v| parse_timestamp(&v))
            .transpose()?;
        let date_to = non_empty(self.date_to)
            .map(|v| parse_timestamp(&v))
            .transpose()?;

        Ok(EntryFilter {
            city: non_empty(self.city),
            date_from,
            date_to,
        })
    }
}

/// Store-level entry filter. All bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub city: Option<String>,
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
}

impl EntryFilter {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.date_from.is_none() && self.date_to.is_none()
    }

    pub fn matches(&self, entry: &WeatherEntry) -> bool {
        if let Some(city) = &self.city {
            if entry.city.as_deref() != Some(city.as_str()) {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if entry.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if entry.timestamp > to {
                return false;
            }
        }
        true
    }
}

/// Response shape for a single entry.
///
/// Field names follow the dashboard's table columns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeatherEntryResponse {
    #[serde(rename = "id")]
    pub id: i64,
    pub date_time: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
    pub city: Option<String>,
    pub source: EntrySource,
}

impl From<WeatherEntry> for WeatherEntryResponse {
    fn from(e: WeatherEntry) -> Self {
        Self {
            id: e.id,
            date_time: format_timestamp(&e.timestamp),
            temperature: e.temperature,
            humidity: e.humidity,
            wind_speed: e.wind_speed,
            description: e.description,
            city: e.city,
            source: e.source,
        }
    }
}
