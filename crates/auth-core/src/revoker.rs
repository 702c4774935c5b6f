//! The Revoker (spec §4.5).
//!
//! Writes the revocation flag only. Does not evict the Client Cache and
//! does not touch the Batch Writer — a freshly issued token may still be
//! sitting in the batch buffer when its revocation lands; the spec's chosen
//! resolution is that a revocation racing an unflushed insert either
//! updates zero rows (treated as success) or is absorbed by the Store.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::error::AuthError;
use crate::storage::Store;
use crate::verifier::TokenVerifier;

pub struct Revoker {
    verifier: Arc<TokenVerifier>,
    store: Arc<dyn Store>,
}

impl Revoker {
    #[must_use]
    pub fn new(verifier: Arc<TokenVerifier>, store: Arc<dyn Store>) -> Self {
        Self { verifier, store }
    }

    /// Runs signature + expiry checks, then marks the token revoked.
    /// Zero rows updated is treated as success (idempotent).
    pub async fn revoke(&self, token_string: &str) -> Result<(), AuthError> {
        let claims = self.verifier.decode_and_check_expiry(token_string)?;

        self.store
            .set_revoked(&claims.token_id, OffsetDateTime::now_utc())
            .await
            .map_err(|err| AuthError::internal(format!("failed to revoke token: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    use async_trait::async_trait;

    use super::*;
    use crate::jwt::JwtService;
    use crate::types::{Claims, Client, IssuedToken, ISSUER};

    #[derive(Default)]
    struct MockStore {
        revoke_calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl Store for MockStore {
        async fn lookup_client(&self, _client_id: &str) -> Result<Option<Client>, AuthError> {
            Ok(None)
        }

        async fn lookup_scopes(&self, _client_id: &str) -> Result<Option<Vec<String>>, AuthError> {
            Ok(None)
        }

        async fn insert_tokens(&self, _batch: &[IssuedToken]) -> Result<(), AuthError> {
            Ok(())
        }

        async fn is_revoked(&self, _token_id: &str) -> Result<bool, AuthError> {
            Ok(false)
        }

        async fn set_revoked(&self, _token_id: &str, _revoked_at: OffsetDateTime) -> Result<(), AuthError> {
            self.revoke_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(AuthError::storage("simulated failure"));
            }
            Ok(())
        }
    }

    const SIGNING_KEY: &[u8] = b"a-sufficiently-long-signing-key";

    fn token_with_ttl(ttl: StdDuration) -> String {
        let jwt = JwtService::new(SIGNING_KEY);
        let iat = OffsetDateTime::now_utc();
        let exp = iat + ttl;
        let claims = Claims {
            client_id: "svc-a".to_string(),
            token_id: "0123456789abcdef0123456789abcdef".to_string(),
            scope: vec!["https://api/users".to_string()],
            iat: iat.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: ISSUER.to_string(),
        };
        jwt.encode(&claims).expect("encode")
    }

    fn revoker(store: Arc<MockStore>) -> Revoker {
        let verifier = Arc::new(TokenVerifier::new(JwtService::new(SIGNING_KEY), store.clone()));
        Revoker::new(verifier, store)
    }

    #[tokio::test]
    async fn revokes_valid_unexpired_token() {
        let store = Arc::new(MockStore::default());
        let r = revoker(store.clone());
        let token = token_with_ttl(StdDuration::from_secs(120));

        r.revoke(&token).await.expect("revoke");
        assert_eq!(store.revoke_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let store = Arc::new(MockStore::default());
        let r = revoker(store.clone());
        let token = token_with_ttl(StdDuration::from_millis(0));
        tokio::time::sleep(StdDuration::from_millis(1100)).await;

        let err = r.revoke(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
        assert_eq!(store.revoke_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_malformed_token() {
        let store = Arc::new(MockStore::default());
        let r = revoker(store.clone());

        let err = r.revoke("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn store_failure_is_internal_error() {
        let store = Arc::new(MockStore::default());
        store.fail.store(true, Ordering::SeqCst);
        let r = revoker(store.clone());
        let token = token_with_ttl(StdDuration::from_secs(120));

        let err = r.revoke(&token).await.unwrap_err();
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn repeated_revocation_is_idempotent() {
        // set_revoked succeeding twice (zero-rows-updated modeled as Ok by
        // the Store) yields the same terminal outcome both times.
        let store = Arc::new(MockStore::default());
        let r = revoker(store.clone());
        let token = token_with_ttl(StdDuration::from_secs(120));

        r.revoke(&token).await.expect("first revoke");
        r.revoke(&token).await.expect("second revoke");
        assert_eq!(store.revoke_calls.load(Ordering::SeqCst), 2);
    }
}
