//! PostgreSQL `Store` implementation for the authentication core.
//!
//! The core never sees raw JSON or SQL; this crate is the single
//! serialization boundary between `auth_core::types::Client`'s
//! `allowed_scopes` and its on-disk JSON representation.

pub mod store;

use std::sync::Arc;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use store::PostgresStore;

/// Connects a pool with the pool-sizing guidance from spec §5
/// (operators override via configuration; these are the Store's own
/// conservative defaults when unconfigured).
pub async fn connect(database_url: &str) -> Result<Arc<PgPool>, sqlx_core::Error> {
    use sqlx_core::pool::PoolOptions;
    let pool = PoolOptions::<Postgres>::new()
        .max_connections(25)
        .min_connections(5)
        .connect(database_url)
        .await?;
    Ok(Arc::new(pool))
}
