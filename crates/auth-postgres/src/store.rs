//! Raw query implementation of [`auth_core::storage::Store`].

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use time::OffsetDateTime;
use tracing::error;

use auth_core::error::AuthError;
use auth_core::storage::Store;
use auth_core::types::{Client, IssuedToken};

use crate::PgPool;

pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn scopes_from_json(value: serde_json::Value) -> Vec<String> {
    let mut scopes = match value {
        serde_json::Value::Array(items) => {
            items.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
        }
        _ => Vec::new(),
    };
    auth_core::types::dedup_scopes(&mut scopes);
    scopes
}

#[async_trait]
impl Store for PostgresStore {
    async fn lookup_client(&self, client_id: &str) -> Result<Option<Client>, AuthError> {
        let row: Option<(String, String, i64, serde_json::Value)> = query_as(
            r#"
            SELECT client_id, client_secret, access_token_ttl_seconds, allowed_scopes
            FROM clients
            WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|err| {
            error!(client_id, error = %err, "lookup_client query failed");
            AuthError::storage(err.to_string())
        })?;

        Ok(row.map(|(client_id, client_secret, ttl_seconds, allowed_scopes)| Client {
            client_id,
            client_secret,
            access_token_ttl: std::time::Duration::from_secs(ttl_seconds.max(0) as u64),
            allowed_scopes: scopes_from_json(allowed_scopes),
        }))
    }

    async fn lookup_scopes(&self, client_id: &str) -> Result<Option<Vec<String>>, AuthError> {
        let row: Option<(serde_json::Value,)> = query_as(
            r#"
            SELECT allowed_scopes FROM clients WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|err| {
            error!(client_id, error = %err, "lookup_scopes query failed");
            AuthError::storage(err.to_string())
        })?;

        Ok(row.map(|(allowed_scopes,)| scopes_from_json(allowed_scopes)))
    }

    /// All-or-nothing insert of `batch` inside a single transaction, in
    /// enqueue order. On a per-row failure the transaction rolls back and
    /// the failing row's position is reported.
    async fn insert_tokens(&self, batch: &[IssuedToken]) -> Result<(), AuthError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|err| {
            error!(error = %err, "failed to start batch insert transaction");
            AuthError::storage(err.to_string())
        })?;

        for (position, token) in batch.iter().enumerate() {
            let result = query(
                r#"
                INSERT INTO issued_tokens (token_id, client_id, issued_at, expires_at, revoked, revoked_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&token.token_id)
            .bind(&token.client_id)
            .bind(token.issued_at)
            .bind(token.expires_at)
            .bind(token.revoked)
            .bind(token.revoked_at)
            .execute(&mut *tx)
            .await;

            if let Err(err) = result {
                error!(position, batch_size = batch.len(), error = %err, "batch insert failed; rolling back");
                return Err(AuthError::storage(format!(
                    "batch insert failed at row {position} of {}: {err}",
                    batch.len()
                )));
            }
        }

        tx.commit().await.map_err(|err| {
            error!(error = %err, "failed to commit batch insert transaction");
            AuthError::storage(err.to_string())
        })
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, AuthError> {
        let revoked: Option<bool> = query_scalar(
            r#"
            SELECT revoked FROM issued_tokens WHERE token_id = $1
            "#,
        )
        .bind(token_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|err| {
            error!(token_id, error = %err, "is_revoked query failed");
            AuthError::storage(err.to_string())
        })?;

        Ok(revoked.unwrap_or(false))
    }

    async fn set_revoked(&self, token_id: &str, revoked_at: OffsetDateTime) -> Result<(), AuthError> {
        query(
            r#"
            UPDATE issued_tokens SET revoked = true, revoked_at = $2 WHERE token_id = $1
            "#,
        )
        .bind(token_id)
        .bind(revoked_at)
        .execute(&*self.pool)
        .await
        .map_err(|err| {
            error!(token_id, error = %err, "set_revoked query failed");
            AuthError::storage(err.to_string())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_from_json_dedups_preserving_order() {
        let value = serde_json::json!(["https://api/users", "https://api/orders", "https://api/users"]);
        assert_eq!(
            scopes_from_json(value),
            vec!["https://api/users".to_string(), "https://api/orders".to_string()]
        );
    }

    #[test]
    fn scopes_from_json_treats_non_array_as_empty() {
        assert!(scopes_from_json(serde_json::json!(null)).is_empty());
        assert!(scopes_from_json(serde_json::json!("not-an-array")).is_empty());
    }
}
