//! The closed error taxonomy for the authentication core.
//!
//! Every outcome the core can produce collapses into one of these variants;
//! a single adapter (`http::error`) renders the fixed JSON envelope from the
//! HTTP surface. Nothing downstream of a handler should match on a raw
//! storage or JWT error — those are wrapped here first.

/// Errors surfaced by the authentication core.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Malformed request body or missing/empty required header.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Missing credential, bad credential, bad/expired signature, revoked token.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Authenticated but not authorized for the requested resource.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// A Store operation failed.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Configuration is missing or invalid.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Any other unexpected failure (signing, serialization, panics recovered
    /// at the HTTP boundary).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// `true` for 4xx-shaped outcomes.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. } | Self::Unauthorized { .. } | Self::Forbidden { .. }
        )
    }

    /// `true` for 5xx-shaped outcomes.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. })
    }

    /// The fixed error-kind token used in the HTTP JSON envelope (spec §7).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                "internal_server_error"
            }
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidRequest { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Storage { message }
            | Self::Configuration { message }
            | Self::Internal { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_and_kind() {
        let err = AuthError::unauthorized("Invalid client credentials");
        assert_eq!(err.to_string(), "Unauthorized: Invalid client credentials");
        assert_eq!(err.kind(), "unauthorized");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn internal_errors_are_server_errors() {
        let err = AuthError::storage("connection refused");
        assert!(err.is_server_error());
        assert_eq!(err.kind(), "internal_server_error");
    }
}
