use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Any failure inside a handler. Always rendered as `500 {"error": ...}`.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl ApiError {
    pub fn message(&self) -> String {
        self.0.to_string()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::InferenceError;

    #[test]
    fn test_any_error_maps_to_500() {
        let err: ApiError = InferenceError::WindowLengthMismatch {
            expected: 3,
            actual: 1,
        }
        .into();
        assert!(err.message().contains("windows of 3"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
