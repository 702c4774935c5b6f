//! Builds the axum app from configuration and runs the ordered shutdown
//! protocol from spec §5.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use auth_core::batch::{BatchConfig, TokenBatchWriter};
use auth_core::cache::{CacheConfig, ClientCache};
use auth_core::http::{self, AppState};
use auth_core::issuer::TokenIssuer;
use auth_core::jwt::JwtService;
use auth_core::resolver::CredentialResolver;
use auth_core::revoker::Revoker;
use auth_core::storage::Store;
use auth_core::verifier::TokenVerifier;
use auth_postgres::PostgresStore;

use crate::config::AuthServerConfig;

pub struct ServerBuilder {
    config: AuthServerConfig,
}

impl ServerBuilder {
    #[must_use]
    pub fn new(config: AuthServerConfig) -> Self {
        Self { config }
    }

    /// Connects to Postgres and wires the five core components behind the
    /// HTTP adapter.
    pub async fn build(self) -> anyhow::Result<AuthServer> {
        let pool = auth_postgres::connect(&self.config.storage.db_connection_string).await?;
        let store: Arc<dyn Store> = Arc::new(PostgresStore::new(pool));

        let cache = ClientCache::new(CacheConfig {
            ttl: self.config.cache.ttl,
            max_size: self.config.cache.max_size,
        });
        let batch_writer = TokenBatchWriter::new(
            store.clone(),
            BatchConfig {
                max_batch: self.config.batch.max_batch,
                flush_interval: self.config.batch.flush_interval,
            },
        );
        let jwt = JwtService::new(self.config.signing.jwt_secret_key.as_bytes());

        let resolver = Arc::new(CredentialResolver::new(cache.clone(), store.clone()));
        let issuer =
            Arc::new(TokenIssuer::new(cache.clone(), store.clone(), batch_writer.clone(), jwt.clone()));
        let verifier = Arc::new(TokenVerifier::new(jwt, store.clone()));
        let revoker = Arc::new(Revoker::new(verifier.clone(), store.clone()));

        let state = AppState::new(resolver, issuer, verifier, revoker);
        let app = http::router(state);

        Ok(AuthServer {
            addr: SocketAddr::from(([0, 0, 0, 0], self.config.server.port)),
            app,
            cache,
            batch_writer,
            store,
            shutdown_timeout: self.config.server.graceful_shutdown_timeout,
        })
    }
}

pub struct AuthServer {
    addr: SocketAddr,
    app: Router,
    cache: Arc<ClientCache>,
    batch_writer: Arc<TokenBatchWriter>,
    store: Arc<dyn Store>,
    shutdown_timeout: Duration,
}

impl AuthServer {
    /// Runs until a shutdown signal arrives, then drives the ordered
    /// shutdown protocol: stop accepting connections, drain inflight
    /// handlers, flush the batch writer, stop cache cleanup, close the
    /// store.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, "auth-server listening");

        axum::serve(listener, self.app).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("inflight handlers drained; running shutdown protocol");

        if tokio::time::timeout(self.shutdown_timeout, self.batch_writer.stop()).await.is_err() {
            tracing::warn!("batch writer did not stop within the grace period");
        }
        if tokio::time::timeout(self.shutdown_timeout, self.cache.stop()).await.is_err() {
            tracing::warn!("client cache cleanup task did not stop within the grace period");
        }

        drop(self.store);
        tracing::info!("shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
