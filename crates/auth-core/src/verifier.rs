//! The Token Verifier (spec §4.4).
//!
//! Decides whether a bearer credential authorizes a specific resource URL.
//! The three terminal outcomes — unauthenticated, forbidden, bad request —
//! are distinct [`AuthError`] variants and must never be conflated; see the
//! decision procedure below.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::warn;

use crate::error::AuthError;
use crate::jwt::JwtService;
use crate::storage::Store;

/// The outcome of a successful verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyOutcome {
    pub client_id: String,
    pub expires_at: OffsetDateTime,
    pub scopes: Vec<String>,
}

pub struct TokenVerifier {
    jwt: JwtService,
    store: Arc<dyn Store>,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(jwt: JwtService, store: Arc<dyn Store>) -> Self {
        Self { jwt, store }
    }

    /// Steps 1-2 of the decision procedure: signature/structure, then expiry.
    /// Shared with the Revoker, which runs only this much before writing the
    /// revocation flag.
    pub fn decode_and_check_expiry(&self, token_string: &str) -> Result<crate::types::Claims, AuthError> {
        let claims = self
            .jwt
            .decode(token_string)
            .map_err(|_| AuthError::unauthorized("Invalid or malformed token"))?;

        let now = OffsetDateTime::now_utc().unix_timestamp();
        if now >= claims.exp {
            return Err(AuthError::unauthorized("Token has expired"));
        }

        Ok(claims)
    }

    /// Runs the full decision procedure: signature, expiry, revocation, then
    /// resource authorization.
    pub async fn verify(&self, token_string: &str, resource_url: &str) -> Result<VerifyOutcome, AuthError> {
        let claims = self.decode_and_check_expiry(token_string)?;

        match self.store.is_revoked(&claims.token_id).await {
            Ok(true) => return Err(AuthError::unauthorized("Token has been revoked")),
            Ok(false) => {}
            Err(err) => {
                warn!(token_id = %claims.token_id, error = %err, "revocation check failed; failing closed");
                return Err(AuthError::unauthorized("Token could not be verified"));
            }
        }

        if resource_url.trim().is_empty() {
            return Err(AuthError::invalid_request("Missing resource URL"));
        }

        if !claims.scope.iter().any(|scope| scope == resource_url) {
            return Err(AuthError::forbidden("Resource not in token scope"));
        }

        let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|_| AuthError::internal("token carried an unrepresentable expiry"))?;

        Ok(VerifyOutcome { client_id: claims.client_id, expires_at, scopes: claims.scope })
    }
}
