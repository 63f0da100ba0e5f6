//! Manual entry endpoint handlers.

use axum::extract::State;
use domain::models::{AddEntryRequest, ListEntriesQuery, WeatherEntryResponse};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::envelope::{Empty, Envelope};
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, OwnerContext};
use crate::middleware::metrics::record_entry_added;

#[derive(Debug, Serialize)]
pub struct AddEntryResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct ListEntriesResponse {
    pub count: usize,
    pub entries: Vec<WeatherEntryResponse>,
}

#[derive(Debug, Serialize)]
pub struct ClearDataResponse {
    pub removed: u64,
}

/// Add a manual entry.
///
/// POST /add_entry
pub async fn add_entry(
    State(state): State<AppState>,
    owner: OwnerContext,
    ApiJson(request): ApiJson<AddEntryRequest>,
) -> Result<Envelope<AddEntryResponse>, ApiError> {
    request.validate()?;
    let entry = request.into_new_entry()?;

    let id = state.store.add(&owner.owner_id, entry).await?;
    record_entry_added();
    info!(owner_id = %owner.owner_id, id, "Entry added");

    Ok(Envelope::success(AddEntryResponse { id }).with_message("Entry added"))
}

/// List entries, newest first.
///
/// GET /get_entries?city=&date_from=&date_to=
pub async fn get_entries(
    State(state): State<AppState>,
    owner: OwnerContext,
    ApiQuery(query): ApiQuery<ListEntriesQuery>,
) -> Result<Envelope<ListEntriesResponse>, ApiError> {
    let filter = query.into_filter()?;
    let entries = state.store.list(&owner.owner_id, &filter).await?;

    let entries: Vec<WeatherEntryResponse> =
        entries.into_iter().map(WeatherEntryResponse::from).collect();

    Ok(Envelope::success(ListEntriesResponse {
        count: entries.len(),
        entries,
    }))
}

/// Delete one entry.
///
/// DELETE /delete_entry/:id
pub async fn delete_entry(
    State(state): State<AppState>,
    owner: OwnerContext,
    ApiPath(id): ApiPath<i64>,
) -> Result<Envelope<Empty>, ApiError> {
    state.store.delete(&owner.owner_id, id).await?;
    info!(owner_id = %owner.owner_id, id, "Entry deleted");

    Ok(Envelope::message("Entry deleted"))
}

/// Remove every entry of the owner.
///
/// POST /clear_data
pub async fn clear_data(
    State(state): State<AppState>,
    owner: OwnerContext,
) -> Result<Envelope<ClearDataResponse>, ApiError> {
    let removed = state.store.clear(&owner.owner_id).await?;
    info!(owner_id = %owner.owner_id, removed, "Entries cleared");

    Ok(Envelope::success(ClearDataResponse { removed }).with_message("All data cleared"))
}
