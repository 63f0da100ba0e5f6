//! Common validation utilities.

use serde::Deserialize;
use thiserror::Error;
use validator::ValidationError;

use crate::time::parse_timestamp;

/// Unit systems understood by the forecast provider.
pub const SUPPORTED_UNITS: [&str; 3] = ["metric", "imperial", "standard"];

/// Error returned when a payload field cannot be read as a float.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Field '{field}' must be a number, got {value:?}")]
pub struct CoercionError {
    pub field: String,
    pub value: String,
}

/// A payload value that must be coercible to `f64`.
///
/// Browsers post form inputs as strings, so both `12.5` and `"12.5"` are
/// accepted. Anything else is rejected when the payload is deserialized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Coerces the value to a finite float.
    pub fn coerce(&self, field: &str) -> Result<f64, CoercionError> {
        let value = match self {
            NumericInput::Number(n) => Some(*n),
            NumericInput::Text(s) => s.trim().parse::<f64>().ok(),
        };

        value.filter(|v| v.is_finite()).ok_or_else(|| CoercionError {
            field: field.to_string(),
            value: match self {
                NumericInput::Number(n) => n.to_string(),
                NumericInput::Text(s) => s.clone(),
            },
        })
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

/// Coerces an optional payload value, defaulting to `0.0` when absent.
pub fn coerce_or_zero(input: Option<&NumericInput>, field: &str) -> Result<f64, CoercionError> {
    input.map_or(Ok(0.0), |v| v.coerce(field))
}

/// Validates that a string parses as an observation timestamp.
pub fn validate_datetime(value: &str) -> Result<(), ValidationError> {
    match parse_timestamp(value) {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("datetime_format");
            err.message = Some(format!("Invalid datetime: {}", value).into());
            Err(err)
        }
    }
}

/// Validates a forecast unit system name.
pub fn validate_units(units: &str) -> Result<(), ValidationError> {
    if SUPPORTED_UNITS.contains(&units) {
        Ok(())
    } else {
        let mut err = ValidationError::new("units_unsupported");
        err.message = Some("Units must be one of: metric, imperial, standard".into());
        Err(err)
    }
}

/// Validates that a label is not only whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        let input = NumericInput::Number(21.5);
        assert_eq!(input.coerce("temperature").unwrap(), 21.5);
    }

    #[test]
    fn test_coerce_numeric_string() {
        let input = NumericInput::Text(" 12 ".to_string());
        assert_eq!(input.coerce("temperature").unwrap(), 12.0);
    }

    #[test]
    fn test_coerce_rejects_words() {
        let err = NumericInput::Text("warm".to_string())
            .coerce("temperature")
            .unwrap_err();
        assert_eq!(err.field, "temperature");
        assert_eq!(err.value, "warm");
        assert_eq!(
            err.to_string(),
            "Field 'temperature' must be a number, got \"warm\""
        );
    }

    #[test]
    fn test_coerce_rejects_empty_and_non_finite() {
        assert!(NumericInput::Text(String::new()).coerce("humidity").is_err());
        assert!(NumericInput::Text("NaN".to_string()).coerce("humidity").is_err());
        assert!(NumericInput::Text("inf".to_string()).coerce("humidity").is_err());
    }

    #[test]
    fn test_coerce_or_zero_defaults() {
        assert_eq!(coerce_or_zero(None, "windspeed").unwrap(), 0.0);
        let input = NumericInput::from(3.2);
        assert_eq!(coerce_or_zero(Some(&input), "windspeed").unwrap(), 3.2);
    }

    #[test]
    fn test_numeric_input_deserialization() {
        let n: NumericInput = serde_json::from_str("7").unwrap();
        assert_eq!(n, NumericInput::Number(7.0));
        let s: NumericInput = serde_json::from_str("\"7.5\"").unwrap();
        assert_eq!(s, NumericInput::Text("7.5".to_string()));
        assert!(serde_json::from_str::<NumericInput>("true").is_err());
    }

    #[test]
    fn test_validate_datetime() {
        assert!(validate_datetime("2024-01-01T00:00").is_ok());
        let err = validate_datetime("soon").unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "Invalid datetime: soon");
    }

    #[test]
    fn test_validate_units() {
        assert!(validate_units("metric").is_ok());
        assert!(validate_units("imperial").is_ok());
        assert!(validate_units("standard").is_ok());
        assert!(validate_units("kelvin").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Pune").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}
