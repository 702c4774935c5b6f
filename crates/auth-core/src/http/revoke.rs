//! `POST /revoke` (spec §6).

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use tracing::{info, warn};

use super::error::error_response;
use super::state::AppState;
use super::{extract_bearer_token, RequestId};
use crate::error::AuthError;

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub message: &'static str,
}

pub async fn revoke_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        warn!(request_id, "missing or malformed Authorization header");
        return error_response(&AuthError::unauthorized("Missing bearer token"), &request_id);
    };

    match state.revoker.revoke(&token).await {
        Ok(()) => {
            info!(request_id, "token revoked");
            Json(RevokeResponse { message: "Token revoked successfully" }).into_response()
        }
        Err(err) => {
            warn!(request_id, error = %err, "token revocation failed");
            error_response(&err, &request_id)
        }
    }
}
