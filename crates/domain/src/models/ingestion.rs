//! How bulk forecast ingestion treats an owner's existing entries.

use std::fmt;

use serde::Deserialize;

/// Ingestion mode for bulk API loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionMode {
    /// Drop the owner's entries and keep only the fetched batch.
    Replace,
    /// Add the fetched batch next to existing entries.
    #[default]
    Append,
}

impl IngestionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionMode::Replace => "replace",
            IngestionMode::Append => "append",
        }
    }
}

impl fmt::Display for IngestionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingestion_mode_deserialize() {
        let mode: IngestionMode = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(mode, IngestionMode::Replace);
        let mode: IngestionMode = serde_json::from_str("\"append\"").unwrap();
        assert_eq!(mode, IngestionMode::Append);
        assert!(serde_json::from_str::<IngestionMode>("\"merge\"").is_err());
    }

    #[test]
    fn test_ingestion_mode_default_and_display() {
        assert_eq!(IngestionMode::default(), IngestionMode::Append);
        assert_eq!(IngestionMode::Replace.to_string(), "replace");
    }
}
