//! Core OAuth 2.0 client-credentials authorization logic.
//!
//! This crate is transport- and storage-agnostic: it depends on the
//! [`storage::Store`] trait for persistence and exposes plain async
//! functions/structs that an HTTP layer (see `auth-server`) wires up.

pub mod batch;
pub mod cache;
pub mod error;
pub mod http;
pub mod issuer;
pub mod jwt;
pub mod resolver;
pub mod revoker;
pub mod storage;
pub mod types;
pub mod verifier;

pub mod prelude {
    pub use crate::cache::{CacheConfig, ClientCache};
    pub use crate::error::AuthError;
    pub use crate::issuer::TokenIssuer;
    pub use crate::jwt::JwtService;
    pub use crate::resolver::CredentialResolver;
    pub use crate::revoker::Revoker;
    pub use crate::storage::Store;
    pub use crate::types::{Claims, Client, IssuedToken};
    pub use crate::verifier::{TokenVerifier, VerifyOutcome};
}
