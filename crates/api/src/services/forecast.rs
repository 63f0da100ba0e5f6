//! Forecast ingestion adapter.
//!
//! Fetches a multi-point forecast from OpenWeatherMap and normalizes each
//! item into a [`ForecastPoint`]. The whole response is parsed before the
//! caller sees any point, so a failure never yields a partial batch.

use std::time::Duration;

use async_trait::async_trait;
use domain::models::{FetchForecastRequest, ForecastPoint};
use reqwest::Client;
use serde::Deserialize;
use shared::time::{from_unix_seconds, parse_timestamp};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ForecastConfig;

/// Forecast adapter errors.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("API key not provided")]
    MissingApiKey,

    /// The provider answered with a non-success status.
    #[error("API Error: {message}")]
    Api { status_code: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid forecast response: {0}")]
    InvalidResponse(String),
}

/// A fully resolved forecast request.
#[derive(Clone, PartialEq, Eq)]
pub struct ForecastQuery {
    pub city: String,
    pub units: String,
    pub api_key: String,
}

impl std::fmt::Debug for ForecastQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastQuery")
            .field("city", &self.city)
            .field("units", &self.units)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ForecastQuery {
    /// Fills omitted request fields from configuration.
    ///
    /// A blank api key counts as omitted.
    pub fn resolve(
        request: FetchForecastRequest,
        config: &ForecastConfig,
    ) -> Result<Self, ForecastError> {
        let api_key = request
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| Some(config.api_key.clone()).filter(|k| !k.trim().is_empty()))
            .ok_or(ForecastError::MissingApiKey)?;

        Ok(Self {
            city: request
                .city
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| config.default_city.clone()),
            units: request
                .units
                .unwrap_or_else(|| config.default_units.clone()),
            api_key,
        })
    }
}

/// Source of forecast points.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetches and normalizes every point of the forecast.
    async fn fetch_forecast(&self, query: &ForecastQuery)
        -> Result<Vec<ForecastPoint>, ForecastError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt: Option<i64>,
    dt_txt: Option<String>,
    main: MainBlock,
    #[serde(default)]
    wind: WindBlock,
    #[serde(default)]
    weather: Vec<WeatherBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherBlock {
    #[serde(default)]
    description: String,
}

impl ForecastItem {
    fn into_point(self, index: usize) -> Result<ForecastPoint, ForecastError> {
        let timestamp = self
            .dt
            .and_then(from_unix_seconds)
            .or_else(|| self.dt_txt.as_deref().and_then(|t| parse_timestamp(t).ok()))
            .ok_or_else(|| {
                ForecastError::InvalidResponse(format!("item {} has no usable timestamp", index))
            })?;

        Ok(ForecastPoint {
            timestamp,
            temperature: self.main.temp,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            description: self
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_default(),
        })
    }
}

/// Parses a 5 day / 3 hour forecast body.
fn parse_forecast(body: &[u8]) -> Result<Vec<ForecastPoint>, ForecastError> {
    let response: ForecastResponse =
        serde_json::from_slice(body).map_err(|e| ForecastError::InvalidResponse(e.to_string()))?;

    response
        .list
        .into_iter()
        .enumerate()
        .map(|(i, item)| item.into_point(i))
        .collect()
}

/// Extracts the provider's `message` field from an error body.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// OpenWeatherMap HTTP client.
#[derive(Debug, Clone)]
pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
}

impl OpenWeatherMapClient {
    /// Creates a client with the configured base URL and timeout.
    pub fn new(config: &ForecastConfig) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast", self.base_url)
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherMapClient {
    #[instrument(skip(self, query), fields(city = %query.city, units = %query.units))]
    async fn fetch_forecast(
        &self,
        query: &ForecastQuery,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let response = self
            .client
            .get(self.forecast_url())
            .query(&[
                ("q", query.city.as_str()),
                ("appid", query.api_key.as_str()),
                ("units", query.units.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ForecastError::Api {
                status_code: status.as_u16(),
                message: error_message(&body),
            });
        }

        let points = parse_forecast(&body)?;
        debug!(count = points.len(), "Parsed forecast");
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> ForecastConfig {
        ForecastConfig {
            api_key: "configured-key".to_string(),
            ..ForecastConfig::default()
        }
    }

    #[test]
    fn test_resolve_uses_config_defaults() {
        let query = ForecastQuery::resolve(FetchForecastRequest::default(), &config()).unwrap();
        assert_eq!(query.city, "Bengaluru");
        assert_eq!(query.units, "metric");
        assert_eq!(query.api_key, "configured-key");
    }

    #[test]
    fn test_resolve_request_overrides() {
        let request = FetchForecastRequest {
            api_key: Some("request-key".to_string()),
            city: Some(" Pune ".to_string()),
            units: Some("imperial".to_string()),
        };
        let query = ForecastQuery::resolve(request, &config()).unwrap();
        assert_eq!(query.city, "Pune");
        assert_eq!(query.units, "imperial");
        assert_eq!(query.api_key, "request-key");
    }

    #[test]
    fn test_resolve_missing_key() {
        let request = FetchForecastRequest {
            api_key: Some("  ".to_string()),
            ..FetchForecastRequest::default()
        };
        let result = ForecastQuery::resolve(request, &ForecastConfig::default());
        assert!(matches!(result, Err(ForecastError::MissingApiKey)));
    }

    #[test]
    fn test_query_debug_redacts_key() {
        let query = ForecastQuery::resolve(FetchForecastRequest::default(), &config()).unwrap();
        let debug = format!("{:?}", query);
        assert!(!debug.contains("configured-key"));
    }

    #[test]
    fn test_parse_forecast_items() {
        let body = br#"{
            "cod": "200",
            "list": [
                {
                    "dt": 1704067200,
                    "main": {"temp": 21.5, "humidity": 60},
                    "wind": {"speed": 3.4},
                    "weather": [{"description": "clear sky"}],
                    "dt_txt": "2024-01-01 00:00:00"
                },
                {
                    "dt_txt": "2024-01-01 03:00:00",
                    "main": {"temp": 19.0, "humidity": 72},
                    "wind": {"speed": 1.1},
                    "weather": []
                }
            ]
        }"#;

        let points = parse_forecast(body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(points[0].temperature, 21.5);
        assert_eq!(points[0].humidity, 60.0);
        assert_eq!(points[0].wind_speed, 3.4);
        assert_eq!(points[0].description, "clear sky");
        assert_eq!(
            points[1].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(3, 0, 0)
                .unwrap()
        );
        assert_eq!(points[1].description, "");
    }

    #[test]
    fn test_parse_forecast_empty_list() {
        assert!(parse_forecast(br#"{"cod": "200"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_forecast_item_without_timestamp() {
        let body = br#"{"list": [{"main": {"temp": 1.0, "humidity": 2.0}}]}"#;
        assert!(matches!(
            parse_forecast(body),
            Err(ForecastError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_forecast_missing_main_fails_whole_batch() {
        let body = br#"{"list": [
            {"dt": 1704067200, "main": {"temp": 1.0, "humidity": 2.0}},
            {"dt": 1704078000}
        ]}"#;
        assert!(parse_forecast(body).is_err());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(br#"{"cod": 401, "message": "Invalid API key"}"#),
            "Invalid API key"
        );
        assert_eq!(error_message(b"<html>bad gateway</html>"), "Unknown error");
        assert_eq!(error_message(br#"{"cod": 500}"#), "Unknown error");
    }
}
