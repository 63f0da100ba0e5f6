use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::models::EntryInputError;
use persistence::StoreError;
use shared::time::TimestampError;
use shared::validation::CoercionError;
use thiserror::Error;

use crate::envelope::Envelope;
use crate::services::dashboard::DashboardError;
use crate::services::forecast::ForecastError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Upstream error: {message}")]
    Upstream {
        status_code: Option<u16>,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::EmptyInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::EmptyInput(msg)
            | ApiError::MethodNotAllowed(msg) => msg,
            ApiError::Timeout => {
                tracing::warn!("Request exceeded the configured timeout");
                "Request timed out".to_string()
            }
            ApiError::Upstream {
                status_code,
                message,
            } => {
                tracing::warn!(upstream_status = ?status_code, "Upstream error: {}", message);
                format!("API Error: {}", message)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        };

        (status, Envelope::error(message)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound("Entry not found".into()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoercionError> for ApiError {
    fn from(err: CoercionError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<TimestampError> for ApiError {
    fn from(err: TimestampError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<EntryInputError> for ApiError {
    fn from(err: EntryInputError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::MissingApiKey => ApiError::Validation(err.to_string()),
            ForecastError::Api {
                status_code,
                message,
            } => ApiError::Upstream {
                status_code: Some(status_code),
                message,
            },
            ForecastError::Http(e) => ApiError::Upstream {
                status_code: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            ForecastError::InvalidResponse(msg) => ApiError::Upstream {
                status_code: None,
                message: msg,
            },
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::EmptyInput => ApiError::EmptyInput(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for '{}'", field))
                })
            })
            .collect();
        messages.sort();

        let message = if messages.len() == 1 {
            messages.remove(0)
        } else {
            messages.join("; ")
        };

        ApiError::Validation(message)
    }
}
