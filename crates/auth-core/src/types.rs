//! Domain types shared across the authentication core.
//!
//! These are plain data types with no behavior tied to a particular
//! transport or storage backend; `Client` in particular is the single
//! serialization boundary between the Store's row representation and the
//! rest of the core (see `auth-postgres`).

use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A registered OAuth 2.0 client-credentials principal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    /// Unique client identifier.
    pub client_id: String,

    /// Opaque secret compared for exact equality during credential resolution.
    pub client_secret: String,

    /// Access token lifetime for tokens issued to this client.
    pub access_token_ttl: StdDuration,

    /// Resource URLs this client's tokens are allowed to carry in `scope`.
    /// Deduplicated; may be empty.
    pub allowed_scopes: Vec<String>,
}

impl Client {
    /// Deduplicates `allowed_scopes` in place, preserving first-seen order.
    pub fn dedup_scopes(&mut self) {
        dedup_scopes(&mut self.allowed_scopes);
    }
}

/// Deduplicates a scope list in place, preserving first-seen order. Shared
/// by `Client::dedup_scopes` and the Store's own scope deserialization, so a
/// scope list is never carried duplicated from either path.
pub fn dedup_scopes(scopes: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::with_capacity(scopes.len());
    scopes.retain(|s| seen.insert(s.clone()));
}

/// A `Client` record held in the in-process cache with its expiry.
#[derive(Debug, Clone)]
pub struct CachedClient {
    pub client: Client,
    pub created_at: tokio::time::Instant,
    pub expires_at: tokio::time::Instant,
}

impl CachedClient {
    pub fn is_live(&self, now: tokio::time::Instant) -> bool {
        now < self.expires_at
    }
}

/// A token record persisted by the Batch Writer once a token has been issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuedToken {
    /// 32-character hex-encoded 128-bit identifier.
    pub token_id: String,
    pub client_id: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub revoked: bool,
    pub revoked_at: Option<OffsetDateTime>,
}

impl IssuedToken {
    #[must_use]
    pub fn new(
        token_id: impl Into<String>,
        client_id: impl Into<String>,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            client_id: client_id.into(),
            issued_at,
            expires_at,
            revoked: false,
            revoked_at: None,
        }
    }

    /// `true` iff this record could be enqueued (non-empty ids).
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.token_id.is_empty() && !self.client_id.is_empty()
    }
}

/// Signed claims carried inside a bearer token, snapshotted at issuance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub client_id: String,
    pub token_id: String,
    pub scope: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Constant issuer value embedded in every token's claims.
pub const ISSUER: &str = "auth-server";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_scopes_preserves_order() {
        let mut client = Client {
            client_id: "svc-a".to_string(),
            client_secret: "s1".to_string(),
            access_token_ttl: StdDuration::from_secs(120),
            allowed_scopes: vec![
                "https://api/users".to_string(),
                "https://api/orders".to_string(),
                "https://api/users".to_string(),
            ],
        };
        client.dedup_scopes();
        assert_eq!(
            client.allowed_scopes,
            vec!["https://api/users".to_string(), "https://api/orders".to_string()]
        );
    }

    #[test]
    fn issued_token_rejects_empty_ids() {
        let now = OffsetDateTime::now_utc();
        let t = IssuedToken::new("", "svc-a", now, now);
        assert!(!t.is_well_formed());
        let t = IssuedToken::new("abc", "", now, now);
        assert!(!t.is_well_formed());
        let t = IssuedToken::new("abc", "svc-a", now, now);
        assert!(t.is_well_formed());
    }
}
