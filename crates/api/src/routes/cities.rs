//! Distinct city listing.

use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extractors::OwnerContext;

#[derive(Debug, Serialize)]
pub struct CitiesResponse {
    pub cities: Vec<String>,
}

/// GET /get_cities
pub async fn get_cities(
    State(state): State<AppState>,
    owner: OwnerContext,
) -> Result<Envelope<CitiesResponse>, ApiError> {
    let cities = state.store.cities(&owner.owner_id).await?;
    Ok(Envelope::success(CitiesResponse { cities }))
}
