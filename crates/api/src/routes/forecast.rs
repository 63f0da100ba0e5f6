//! Forecast ingestion endpoint handler.

use axum::extract::State;
use domain::models::{FetchForecastRequest, NewWeatherEntry};
use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extractors::{ApiJson, OwnerContext};
use crate::middleware::metrics::{record_entries_ingested, record_forecast_failure};
use crate::services::forecast::ForecastQuery;

#[derive(Debug, Serialize)]
pub struct FetchForecastResponse {
    pub entries_count: usize,
    pub city: String,
    pub mode: &'static str,
}

/// Fetch a forecast and ingest it.
///
/// POST /fetch_api_data
///
/// The forecast is fetched and parsed completely before the store is
/// touched, so an upstream failure leaves the owner's entries unchanged.
pub async fn fetch_api_data(
    State(state): State<AppState>,
    owner: OwnerContext,
    ApiJson(request): ApiJson<FetchForecastRequest>,
) -> Result<Envelope<FetchForecastResponse>, ApiError> {
    request.validate()?;
    let query = ForecastQuery::resolve(request, &state.config.forecast)?;

    let points = match state.forecast.fetch_forecast(&query).await {
        Ok(points) => points,
        Err(e) => {
            record_forecast_failure();
            warn!(owner_id = %owner.owner_id, city = %query.city, error = %e, "Forecast fetch failed");
            return Err(e.into());
        }
    };

    let entries: Vec<NewWeatherEntry> = points
        .into_iter()
        .map(|p| p.into_new_entry(&query.city))
        .collect();

    let mode = state.config.ingestion.mode;
    let count = state.store.ingest(&owner.owner_id, entries, mode).await?;
    record_entries_ingested(count, mode);
    info!(owner_id = %owner.owner_id, city = %query.city, count, %mode, "Forecast ingested");

    let message = format!("Loaded {} entries from API for {}", count, query.city);
    Ok(Envelope::success(FetchForecastResponse {
        entries_count: count,
        city: query.city,
        mode: mode.as_str(),
    })
    .with_message(message))
}
