//! Layered configuration: built-in defaults, then an optional TOML file,
//! then environment variables (prefix `AUTH_SERVER`). Grounded on the
//! teacher's config module — a root struct of nested, individually
//! `Default`-able sections, validated once at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration value: {0}")]
    Missing(String),

    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl ConfigError {
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue { field: field.into(), reason: reason.into() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    #[serde(with = "humantime_serde")]
    pub graceful_shutdown_timeout: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8080, graceful_shutdown_timeout: Duration::from_secs(30) }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningSettings {
    /// Process-wide HMAC-SHA256 signing key (spec §9.1). Required; no default.
    pub jwt_secret_key: String,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self { jwt_secret_key: String::new() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    pub db_connection_string: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { db_connection_string: String::new() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    pub max_size: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl: auth_core::cache::DEFAULT_TTL, max_size: auth_core::cache::DEFAULT_MAX_SIZE }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchSettings {
    pub max_batch: usize,
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_batch: auth_core::batch::DEFAULT_MAX_BATCH,
            flush_interval: auth_core::batch::DEFAULT_FLUSH_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub log_level: String,
    /// Optional file path for log output (spec §6). `None` logs to stdout.
    pub log_path: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { log_level: "info".to_string(), log_path: None }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthServerConfig {
    pub server: ServerSettings,
    pub signing: SigningSettings,
    pub storage: StorageSettings,
    pub cache: CacheSettings,
    pub batch: BatchSettings,
    pub logging: LoggingSettings,
}

impl AuthServerConfig {
    /// Loads defaults, then `config/auth-server.toml` if present, then
    /// environment variables prefixed `AUTH_SERVER__` (double underscore
    /// separating nested keys, e.g. `AUTH_SERVER__SERVER__PORT`).
    pub fn load() -> Result<Self, ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::with_name("config/auth-server").required(false))
            .add_source(config::Environment::with_prefix("AUTH_SERVER").separator("__"))
            .build()
            .map_err(|err| ConfigError::Load(err.to_string()))?;

        // Every section derives `Default` and is marked `#[serde(default)]`,
        // so keys absent from both the file and the environment fall back
        // to the built-in defaults above.
        let loaded: Self = built.try_deserialize().map_err(|err| ConfigError::Load(err.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Field-by-field validation; missing required options abort startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing.jwt_secret_key.is_empty() {
            return Err(ConfigError::Missing("signing.jwt_secret_key".to_string()));
        }
        if self.signing.jwt_secret_key.len() < 16 {
            return Err(ConfigError::invalid(
                "signing.jwt_secret_key",
                "must be at least 16 bytes",
            ));
        }
        if self.storage.db_connection_string.is_empty() {
            return Err(ConfigError::Missing("storage.db_connection_string".to_string()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be nonzero"));
        }
        if self.cache.max_size == 0 {
            return Err(ConfigError::invalid("cache.max_size", "must be positive"));
        }
        if self.batch.max_batch == 0 {
            return Err(ConfigError::invalid("batch.max_batch", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_signing_key() {
        let config = AuthServerConfig {
            storage: StorageSettings { db_connection_string: "postgres://x".to_string() },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Missing(field)) if field == "signing.jwt_secret_key"));
    }

    #[test]
    fn rejects_short_signing_key() {
        let config = AuthServerConfig {
            signing: SigningSettings { jwt_secret_key: "short".to_string() },
            storage: StorageSettings { db_connection_string: "postgres://x".to_string() },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn accepts_fully_populated_config() {
        let config = AuthServerConfig {
            signing: SigningSettings { jwt_secret_key: "a-sufficiently-long-signing-key".to_string() },
            storage: StorageSettings { db_connection_string: "postgres://localhost/auth".to_string() },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn log_path_defaults_to_stdout_and_is_optional() {
        let settings = LoggingSettings::default();
        assert_eq!(settings.log_level, "info");
        assert!(settings.log_path.is_none());

        let config = AuthServerConfig {
            signing: SigningSettings { jwt_secret_key: "a-sufficiently-long-signing-key".to_string() },
            storage: StorageSettings { db_connection_string: "postgres://localhost/auth".to_string() },
            logging: LoggingSettings { log_level: "debug".to_string(), log_path: Some("/var/log/auth-server.log".to_string()) },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
