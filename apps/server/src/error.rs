//! API error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Internal(String),
}

impl From<milkline_core::Error> for ApiError {
    fn from(err: milkline_core::Error) -> Self {
        match err {
            milkline_core::Error::Validation(message) => Self::BadRequest(message),
            milkline_core::Error::NotFound(message) => Self::NotFound(message),
            milkline_core::Error::Unauthorized(message) => Self::Unauthorized(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_the_right_status() {
        let cases = [
            (
                milkline_core::Error::validation("bad liters"),
                StatusCode::BAD_REQUEST,
            ),
            (
                milkline_core::Error::not_found("no collection"),
                StatusCode::NOT_FOUND,
            ),
            (
                milkline_core::Error::unauthorized("no token"),
                StatusCode::UNAUTHORIZED,
            ),
            (
                milkline_core::Error::remote("upstream down"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
