//! The single adapter rendering [`AuthError`] as the fixed JSON envelope
//! (spec §6, §7). No handler should build an error body by hand.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::AuthError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    error_description: String,
    request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        AuthError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AuthError::Storage { .. } | AuthError::Configuration { .. } | AuthError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Renders `err` as the fixed error envelope, tagging it with `request_id`.
pub fn error_response(err: &AuthError, request_id: &str) -> Response {
    let status = status_for(err);
    let body = ErrorBody {
        error: err.kind(),
        error_description: err.message().to_string(),
        request_id: request_id.to_string(),
        details: None,
    };

    let mut response = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(axum::http::header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_variant_to_its_status() {
        assert_eq!(status_for(&AuthError::invalid_request("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AuthError::unauthorized("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&AuthError::forbidden("x")), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&AuthError::storage("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(&AuthError::configuration("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(&AuthError::internal("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
