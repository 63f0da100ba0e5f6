//! Configuration summary exposed to the dashboard.

use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::config::Config;
use crate::envelope::Envelope;

/// Non-secret view of the forecast and ingestion settings.
#[derive(Debug, Serialize, PartialEq)]
pub struct ConfigSummary {
    pub api_key_set: bool,
    pub city: String,
    pub units: String,
    pub ingestion_mode: &'static str,
    pub storage_backend: &'static str,
}

impl ConfigSummary {
    pub fn new(config: &Config, storage_backend: &'static str) -> Self {
        Self {
            api_key_set: !config.forecast.api_key.trim().is_empty(),
            city: config.forecast.default_city.clone(),
            units: config.forecast.default_units.clone(),
            ingestion_mode: config.ingestion.mode.as_str(),
            storage_backend,
        }
    }
}

/// GET /get_config
pub async fn get_config(State(state): State<AppState>) -> Envelope<ConfigSummary> {
    Envelope::success(ConfigSummary::new(
        &state.config,
        state.store.backend_name(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_without_key() {
        let config = Config::load_for_test(&[]).unwrap();
        let summary = ConfigSummary::new(&config, "memory");
        assert!(!summary.api_key_set);
        assert_eq!(summary.city, "Bengaluru");
        assert_eq!(summary.units, "metric");
        assert_eq!(summary.ingestion_mode, "append");
    }

    #[test]
    fn test_summary_never_exposes_key() {
        let config = Config::load_for_test(&[("forecast.api_key", "secret-key")]).unwrap();
        let summary = ConfigSummary::new(&config, "sqlite");
        assert!(summary.api_key_set);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
