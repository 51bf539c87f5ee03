use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::data::FilterError;

/// Errors returned by the JSON endpoints.
#[derive(Debug)]
pub enum ApiError {
    InvalidFilter(FilterError),
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::InvalidFilter(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::InvalidFilter(err) => {
                (StatusCode::BAD_REQUEST, "INVALID_FILTER", err.to_string())
            }
        };

        (status, Json(json!({"error": message, "code": code}))).into_response()
    }
}
