//! Alert threshold endpoint handlers.

use axum::extract::State;
use domain::models::{AlertThresholds, SetAlertsRequest};
use tracing::info;

use crate::app::AppState;
use crate::envelope::{Empty, Envelope};
use crate::error::ApiError;
use crate::extractors::{ApiJson, OwnerContext};

/// Store the owner's thresholds. Omitted values are cleared.
///
/// POST /set_alerts
pub async fn set_alerts(
    State(state): State<AppState>,
    owner: OwnerContext,
    ApiJson(request): ApiJson<SetAlertsRequest>,
) -> Result<Envelope<Empty>, ApiError> {
    let thresholds = request.into_thresholds()?;
    state.store.set_alerts(&owner.owner_id, thresholds).await?;
    info!(
        owner_id = %owner.owner_id,
        temp_threshold = ?thresholds.temp_threshold,
        humidity_threshold = ?thresholds.humidity_threshold,
        "Alert thresholds updated"
    );

    Ok(Envelope::message("Alerts configured"))
}

/// GET /get_alerts
pub async fn get_alerts(
    State(state): State<AppState>,
    owner: OwnerContext,
) -> Result<Envelope<AlertThresholds>, ApiError> {
    let thresholds = state.store.get_alerts(&owner.owner_id).await?;
    Ok(Envelope::success(thresholds))
}
