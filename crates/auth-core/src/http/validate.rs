//! `POST /validate` (spec §6) — the gateway's resource-scoped check.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use tracing::{info, warn};

use super::error::error_response;
use super::state::AppState;
use super::{extract_bearer_token, RequestId, RESOURCE_HEADER};
use crate::error::AuthError;

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub client_id: String,
    pub expires_at: i64,
    pub scopes: Vec<String>,
}

pub async fn validate_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        warn!(request_id, "missing or malformed Authorization header");
        return error_response(&AuthError::unauthorized("Missing bearer token"), &request_id);
    };

    let resource_url = headers.get(RESOURCE_HEADER).and_then(|v| v.to_str().ok()).unwrap_or("");

    match state.verifier.verify(&token, resource_url).await {
        Ok(outcome) => {
            info!(request_id, client_id = %outcome.client_id, "token validated");
            Json(ValidateResponse {
                valid: true,
                client_id: outcome.client_id,
                expires_at: outcome.expires_at.unix_timestamp(),
                scopes: outcome.scopes,
            })
            .into_response()
        }
        Err(err) => {
            warn!(request_id, error = %err, "token validation failed");
            error_response(&err, &request_id)
        }
    }
}
