//! Shared state handed to every HTTP handler.

use std::sync::Arc;

use crate::issuer::TokenIssuer;
use crate::resolver::CredentialResolver;
use crate::revoker::Revoker;
use crate::verifier::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<CredentialResolver>,
    pub issuer: Arc<TokenIssuer>,
    pub verifier: Arc<TokenVerifier>,
    pub revoker: Arc<Revoker>,
}

impl AppState {
    #[must_use]
    pub fn new(
        resolver: Arc<CredentialResolver>,
        issuer: Arc<TokenIssuer>,
        verifier: Arc<TokenVerifier>,
        revoker: Arc<Revoker>,
    ) -> Self {
        Self { resolver, issuer, verifier, revoker }
    }
}
