//! Binary-crate library half: configuration, observability, and the
//! server builder. Kept separate from `main.rs` so integration tests can
//! drive a real app instance.

pub mod config;
pub mod observability;
pub mod server;

pub use config::AuthServerConfig;
pub use observability::{init_tracing, shutdown_tracing};
pub use server::ServerBuilder;
