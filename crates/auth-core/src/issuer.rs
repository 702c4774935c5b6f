//! The Token Issuer (spec §4.3).
//!
//! Produces a signed bearer credential for a client the Credential Resolver
//! has already authenticated. Scope resolution is a separate, cache-first
//! lookup from the full client record passed in — it exists so a cache miss
//! never forces the Store to re-materialize a client's secret just to read
//! its scopes.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use rand::RngCore;
use time::OffsetDateTime;
use tracing::error;

use crate::batch::TokenBatchWriter;
use crate::cache::ClientCache;
use crate::error::AuthError;
use crate::jwt::JwtService;
use crate::storage::Store;
use crate::types::{Claims, Client, IssuedToken, ISSUER};

/// A freshly issued bearer credential.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedCredential {
    pub token_string: String,
    pub token_id: String,
    pub expires_in: StdDuration,
}

pub struct TokenIssuer {
    cache: Arc<ClientCache>,
    store: Arc<dyn Store>,
    batch_writer: Arc<TokenBatchWriter>,
    jwt: JwtService,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(
        cache: Arc<ClientCache>,
        store: Arc<dyn Store>,
        batch_writer: Arc<TokenBatchWriter>,
        jwt: JwtService,
    ) -> Self {
        Self { cache, store, batch_writer, jwt }
    }

    /// Issues a token for a client the caller has already authenticated.
    /// `client` supplies `client_id` and `access_token_ttl`; scopes are
    /// resolved independently (cache, then Store) as described above.
    pub async fn issue(&self, client: &Client) -> Result<IssuedCredential, AuthError> {
        let token_id = generate_token_id();
        let scope = self.resolve_scopes(&client.client_id).await?;

        let iat = OffsetDateTime::now_utc();
        let exp = iat + client.access_token_ttl;

        let claims = Claims {
            client_id: client.client_id.clone(),
            token_id: token_id.clone(),
            scope,
            iat: iat.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: ISSUER.to_string(),
        };

        let token_string = self.jwt.encode(&claims).map_err(|err| {
            error!(client_id = %client.client_id, error = %err, "failed to sign issued token");
            AuthError::internal("failed to sign token")
        })?;

        let record = IssuedToken::new(token_id.clone(), client.client_id.clone(), iat, exp);
        self.batch_writer.add(record).await;

        Ok(IssuedCredential { token_string, token_id, expires_in: client.access_token_ttl })
    }

    async fn resolve_scopes(&self, client_id: &str) -> Result<Vec<String>, AuthError> {
        if let Some(cached) = self.cache.get(client_id) {
            return Ok(cached.allowed_scopes);
        }

        self.store
            .lookup_scopes(client_id)
            .await
            .map_err(|err| {
                error!(client_id, error = %err, "scope lookup failed during issuance");
                AuthError::internal("failed to resolve client scopes")
            })?
            .ok_or_else(|| {
                error!(client_id, "client record missing at issuance after successful credential resolution");
                AuthError::internal("client record not found during issuance")
            })
    }
}

/// 128 bits of cryptographically strong randomness, hex-encoded (32 chars).
fn generate_token_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
