//! Weather entry entity (database row mapping).

use chrono::{DateTime, NaiveDateTime, Utc};
use domain::models::{EntrySource, WeatherEntry};
use sqlx::FromRow;

/// Database enum for the `source` column, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum EntrySourceDb {
    Manual,
    Api,
}

impl From<EntrySource> for EntrySourceDb {
    fn from(source: EntrySource) -> Self {
        match source {
            EntrySource::Manual => EntrySourceDb::Manual,
            EntrySource::Api => EntrySourceDb::Api,
        }
    }
}

impl From<EntrySourceDb> for EntrySource {
    fn from(source: EntrySourceDb) -> Self {
        match source {
            EntrySourceDb::Manual => EntrySource::Manual,
            EntrySourceDb::Api => EntrySource::Api,
        }
    }
}

/// Database row mapping for the weather_entries table.
#[derive(Debug, Clone, FromRow)]
pub struct WeatherEntryEntity {
    pub id: i64,
    pub owner_id: String,
    pub observed_at: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
    pub city: Option<String>,
    pub source: EntrySourceDb,
    pub created_at: DateTime<Utc>,
}

impl From<WeatherEntryEntity> for WeatherEntry {
    fn from(entity: WeatherEntryEntity) -> Self {
        Self {
            id: entity.id,
            owner_id: entity.owner_id,
            timestamp: entity.observed_at,
            temperature: entity.temperature,
            humidity: entity.humidity,
            wind_speed: entity.wind_speed,
            description: entity.description,
            city: entity.city,
            source: entity.source.into(),
            created_at: entity.created_at,
        }
    }
}
