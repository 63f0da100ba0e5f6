//! Alert threshold domain model.
//!
//! Thresholds are stored per owner and returned on request. Nothing
//! evaluates them against incoming entries.

use serde::{Deserialize, Serialize};
use shared::validation::{CoercionError, NumericInput};

/// Per-owner alert thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub temp_threshold: Option<f64>,
    pub humidity_threshold: Option<f64>,
}

/// Request payload for configuring alert thresholds.
///
/// Both values are overwritten; an omitted value clears the threshold.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetAlertsRequest {
    #[serde(default)]
    pub temp_threshold: Option<NumericInput>,
    #[serde(default)]
    pub humidity_threshold: Option<NumericInput>,
}

impl SetAlertsRequest {
    pub fn into_thresholds(self) -> Result<AlertThresholds, CoercionError> {
        Ok(AlertThresholds {
            temp_threshold: self
                .temp_threshold
                .map(|v| v.coerce("temp_threshold"))
                .transpose()?,
            humidity_threshold: self
                .humidity_threshold
                .map(|v| v.coerce("humidity_threshold"))
                .transpose()?,
        })
    }
}
