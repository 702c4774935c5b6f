//! The Credential Resolver (spec §4.6).
//!
//! Looks up a client by identifier, cache first, and compares the presented
//! secret for exact equality. Deliberately does not distinguish "unknown
//! client" from "wrong secret" in its result — both collapse to `None` so
//! the HTTP layer reports the same *unauthorized* outcome either way.

use std::sync::Arc;

use tracing::error;

use crate::cache::ClientCache;
use crate::error::AuthError;
use crate::storage::Store;
use crate::types::Client;

pub struct CredentialResolver {
    cache: Arc<ClientCache>,
    store: Arc<dyn Store>,
}

impl CredentialResolver {
    #[must_use]
    pub fn new(cache: Arc<ClientCache>, store: Arc<dyn Store>) -> Self {
        Self { cache, store }
    }

    /// `Ok(Some(client))` iff `client_id` exists and `client_secret` matches
    /// exactly. `Ok(None)` for either an unknown client or a wrong secret —
    /// callers must not distinguish the two in their response.
    pub async fn resolve(&self, client_id: &str, client_secret: &str) -> Result<Option<Client>, AuthError> {
        let client = match self.cache.get(client_id) {
            Some(client) => client,
            None => match self.store.lookup_client(client_id).await.map_err(|err| {
                error!(client_id, error = %err, "client lookup failed during credential resolution");
                AuthError::internal("failed to resolve client credentials")
            })? {
                Some(client) => {
                    self.cache.set(client_id, client.clone());
                    client
                }
                None => return Ok(None),
            },
        };

        if client.client_secret == client_secret {
            Ok(Some(client))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use async_trait::async_trait;
    use time::OffsetDateTime;
    use tokio::sync::Mutex;

    use super::*;
    use crate::cache::CacheConfig;
    use crate::types::IssuedToken;

    #[derive(Default)]
    struct MockStore {
        client: Mutex<Option<Client>>,
        lookup_calls: Mutex<u32>,
    }

    #[async_trait]
    impl Store for MockStore {
        async fn lookup_client(&self, _client_id: &str) -> Result<Option<Client>, AuthError> {
            *self.lookup_calls.lock().await += 1;
            Ok(self.client.lock().await.clone())
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
            Ok(())
        }
    }

    fn client() -> Client {
        Client {
            client_id: "svc-a".to_string(),
            client_secret: "s1".to_string(),
            access_token_ttl: StdDuration::from_secs(120),
            allowed_scopes: vec!["https://api/users".to_string()],
        }
    }

    #[tokio::test]
    async fn resolves_on_store_miss_then_caches() {
        let store = Arc::new(MockStore::default());
        *store.client.lock().await = Some(client());
        let cache = ClientCache::new(CacheConfig::default());
        let resolver = CredentialResolver::new(cache.clone(), store.clone());

        let resolved = resolver.resolve("svc-a", "s1").await.expect("resolve").expect("present");
        assert_eq!(resolved.client_id, "svc-a");
        assert_eq!(*store.lookup_calls.lock().await, 1);

        // Second call should hit the cache, not the store.
        resolver.resolve("svc-a", "s1").await.expect("resolve");
        assert_eq!(*store.lookup_calls.lock().await, 1);

        cache.stop().await;
    }

    #[tokio::test]
    async fn wrong_secret_and_unknown_client_both_yield_none() {
        let store = Arc::new(MockStore::default());
        *store.client.lock().await = Some(client());
        let cache = ClientCache::new(CacheConfig::default());
        let resolver = CredentialResolver::new(cache.clone(), store.clone());

        assert!(resolver.resolve("svc-a", "WRONG").await.expect("resolve").is_none());

        *store.client.lock().await = None;
        cache.clear();
        assert!(resolver.resolve("svc-unknown", "anything").await.expect("resolve").is_none());

        cache.stop().await;
    }
}
