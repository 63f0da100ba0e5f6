//! Alert threshold entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::AlertThresholds;
use sqlx::FromRow;

/// Database row mapping for the alert_thresholds table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertThresholdEntity {
    pub owner_id: String,
    pub temp_threshold: Option<f64>,
    pub humidity_threshold: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

impl From<AlertThresholdEntity> for AlertThresholds {
    fn from(entity: AlertThresholdEntity) -> Self {
        Self {
            temp_threshold: entity.temp_threshold,
            humidity_threshold: entity.humidity_threshold,
        }
    }
}
