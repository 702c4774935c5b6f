//! The Store contract (spec §6).
//!
//! The core depends only on this trait; `auth-postgres` provides the
//! concrete implementation. Exactly the five operations the authentication
//! core actually issues are exposed here — the relational schema is
//! otherwise out of scope.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::AuthError;
use crate::types::{Client, IssuedToken};

/// Storage operations required by the authentication core.
#[async_trait]
pub trait Store: Send + Sync {
    /// Looks up a client's full record by identifier.
    async fn lookup_client(&self, client_id: &str) -> Result<Option<Client>, AuthError>;

    /// Looks up a client's allowed scopes only, distinct from a full client
    /// lookup so the Token Issuer can avoid materializing secrets on a cache
    /// miss that only needs scopes.
    async fn lookup_scopes(&self, client_id: &str) -> Result<Option<Vec<String>>, AuthError>;

    /// Persists a batch of issued tokens inside a single transaction,
    /// all-or-nothing.
    async fn insert_tokens(&self, batch: &[IssuedToken]) -> Result<(), AuthError>;

    /// Returns whether the given token has been revoked. An absent row is
    /// treated as not revoked.
    async fn is_revoked(&self, token_id: &str) -> Result<bool, AuthError>;

    /// Marks a token revoked. Idempotent: zero rows matched is success.
    async fn set_revoked(&self, token_id: &str, revoked_at: OffsetDateTime) -> Result<(), AuthError>;
}
