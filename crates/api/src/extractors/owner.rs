//! Owner context extractor.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::app::AppState;
use crate::error::ApiError;

/// Header naming the owner a request acts for.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Longest accepted owner id.
pub const MAX_OWNER_ID_LENGTH: usize = 64;

/// The owner every store operation of a request is scoped to.
///
/// Taken from the `X-Owner-Id` header. Requests without the header act for
/// the configured default owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerContext {
    pub owner_id: String,
}

impl OwnerContext {
    fn from_header(value: Option<&str>, default_id: &str) -> Result<Self, ApiError> {
        let owner_id = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default_id);

        if owner_id.chars().count() > MAX_OWNER_ID_LENGTH {
            return Err(ApiError::Validation(format!(
                "Owner id must be at most {} characters",
                MAX_OWNER_ID_LENGTH
            )));
        }

        Ok(Self {
            owner_id: owner_id.to_string(),
        })
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for OwnerContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(OWNER_HEADER) {
            Some(value) => Some(value.to_str().map_err(|_| {
                ApiError::Validation("Owner id must be visible ASCII".to_string())
            })?),
            None => None,
        };

        OwnerContext::from_header(header, &state.config.owner.default_id)
    }
}
