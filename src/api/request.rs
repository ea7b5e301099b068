//! Request types for the payroll API.
//!
//! This module defines the caller identity extractor, the (year, month)
//! path parameters and the optional upsert body.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequestParts, Path},
    http::{StatusCode, request::Parts},
};
use serde::Deserialize;

use crate::service::UpsertPeriodRequest;

use super::response::{ApiError, ApiErrorResponse};

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, taken from the [`USER_ID_HEADER`] header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| ActingUser(id.to_string()))
            .ok_or_else(|| {
                ApiErrorResponse::new(
                    StatusCode::UNAUTHORIZED,
                    ApiError::missing_identity(USER_ID_HEADER),
                )
            })
    }
}

/// The `:year/:month` segment shared by every route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PeriodPath {
    /// Period year.
    pub year: i32,
    /// Period month.
    pub month: u32,
}

#[async_trait]
impl<S> FromRequestParts<S> for PeriodPath
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(path) = Path::<PeriodPath>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiErrorResponse::new(
                    StatusCode::BAD_REQUEST,
                    ApiError::validation_error(format!("Invalid period path: {}", rejection)),
                )
            })?;
        Ok(path)
    }
}

/// Parses the optional upsert body. An empty body means "no changes".
pub fn parse_upsert_body(body: &Bytes) -> Result<UpsertPeriodRequest, ApiErrorResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UpsertPeriodRequest::default());
    }

    serde_json::from_slice(body).map_err(|err| {
        ApiErrorResponse::new(
            StatusCode::BAD_REQUEST,
            ApiError::malformed_json(format!("Invalid upsert body: {}", err)),
        )
    })
}
