//! `POST /token` (spec §6).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::error::error_response;
use super::state::AppState;
use super::RequestId;
use crate::error::AuthError;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

const SUPPORTED_GRANT_TYPE: &str = "client_credentials";

pub async fn token_handler(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            warn!(request_id, error = %rejection, "malformed token request body");
            return error_response(&AuthError::invalid_request("Invalid request body"), &request_id);
        }
    };

    if request.grant_type != SUPPORTED_GRANT_TYPE {
        warn!(request_id, grant_type = %request.grant_type, "unsupported grant_type");
        return error_response(&AuthError::invalid_request("Unsupported grant_type"), &request_id);
    }

    let client = match state.resolver.resolve(&request.client_id, &request.client_secret).await {
        Ok(Some(client)) => client,
        Ok(None) => {
            warn!(request_id, client_id = %request.client_id, "invalid client credentials");
            return error_response(&AuthError::unauthorized("Invalid client credentials"), &request_id);
        }
        Err(err) => {
            error!(request_id, error = %err, "credential resolution failed");
            return error_response(&err, &request_id);
        }
    };

    match state.issuer.issue(&client).await {
        Ok(issued) => {
            info!(request_id, client_id = %request.client_id, token_id = %issued.token_id, "issued token");
            Json(TokenResponse {
                access_token: issued.token_string,
                token_type: "Bearer",
                expires_in: issued.expires_in.as_secs(),
            })
            .into_response()
        }
        Err(err) => {
            error!(request_id, client_id = %request.client_id, error = %err, "token issuance failed");
            error_response(&err, &request_id)
        }
    }
}
