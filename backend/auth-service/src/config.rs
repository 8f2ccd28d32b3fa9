//! Configuration management for auth-service
//!
//! Loads settings from environment variables, with a .env file picked up in
//! development builds. Required settings fail fast at startup.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// JWT secrets shorter than this are brute-forceable; refuse to start.
const MIN_SECRET_BYTES: usize = 32;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub amqp: AmqpSettings,
    pub server: ServerSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Load .env file in development
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            database: DatabaseSettings::from_env()?,
            jwt: JwtSettings::from_env()?,
            amqp: AmqpSettings::from_env(),
            server: ServerSettings::from_env()?,
        })
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: u64,
}

impl DatabaseSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            acquire_timeout: env::var("DATABASE_ACQUIRE_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid DATABASE_ACQUIRE_TIMEOUT")?,
        })
    }
}

/// JWT signing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    pub secret: String,
}

impl JwtSettings {
    fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.len() < MIN_SECRET_BYTES {
            bail!("JWT_SECRET must be at least {} bytes", MIN_SECRET_BYTES);
        }
        Ok(Self { secret })
    }
}

/// AMQP event publishing settings.
///
/// The broker is optional: without AMQP_URL the service runs with event
/// publishing disabled and registration still succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmqpSettings {
    pub url: Option<String>,
    pub exchange: String,
}

impl AmqpSettings {
    fn from_env() -> Self {
        Self {
            url: env::var("AMQP_URL").ok(),
            exchange: env::var("AMQP_EXCHANGE").unwrap_or_else(|_| "user-events".to_string()),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsSettings>,
}

/// TLS cert/key pair for the gRPC listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsSettings {
    pub cert_file: String,
    pub key_file: String,
}

impl ServerSettings {
    fn from_env() -> Result<Self> {
        let tls_enabled: bool = env::var("TLS_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .context("Invalid TLS_ENABLED")?;

        let tls = if tls_enabled {
            Some(TlsSettings {
                cert_file: env::var("TLS_CERT_FILE")
                    .context("TLS_CERT_FILE must be set when TLS_ENABLED=true")?,
                key_file: env::var("TLS_KEY_FILE")
                    .context("TLS_KEY_FILE must be set when TLS_ENABLED=true")?,
            })
        } else {
            None
        };

        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "50051".to_string())
                .parse()
                .context("Invalid SERVER_PORT")?,
            tls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_jwt_settings_from_env() {
        env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");

        let settings = JwtSettings::from_env().unwrap();
        assert_eq!(settings.secret, "0123456789abcdef0123456789abcdef");

        env::remove_var("JWT_SECRET");
    }

    #[test]
    #[serial]
    fn test_jwt_secret_too_short_is_rejected() {
        env::set_var("JWT_SECRET", "short");

        assert!(JwtSettings::from_env().is_err());

        env::remove_var("JWT_SECRET");
    }

    #[test]
    #[serial]
    fn test_database_settings_from_env() {
        env::set_var("DATABASE_URL", "postgres://localhost/test");
        env::set_var("DATABASE_MAX_CONNECTIONS", "25");

        let settings = DatabaseSettings::from_env().unwrap();

        assert_eq!(settings.url, "postgres://localhost/test");
        assert_eq!(settings.max_connections, 25);
        assert_eq!(settings.acquire_timeout, 5); // Default

        env::remove_var("DATABASE_URL");
        env::remove_var("DATABASE_MAX_CONNECTIONS");
    }

    #[test]
    #[serial]
    fn test_amqp_settings_default_exchange() {
        env::remove_var("AMQP_URL");
        env::remove_var("AMQP_EXCHANGE");

        let settings = AmqpSettings::from_env();

        assert!(settings.url.is_none());
        assert_eq!(settings.exchange, "user-events");
    }

    #[test]
    #[serial]
    fn test_server_settings_defaults() {
        env::remove_var("SERVER_HOST");
        env::remove_var("SERVER_PORT");
        env::remove_var("TLS_ENABLED");

        let settings = ServerSettings::from_env().unwrap();

        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 50051);
        assert!(settings.tls.is_none());
    }

    #[test]
    #[serial]
    fn test_tls_requires_cert_and_key() {
        env::set_var("TLS_ENABLED", "true");
        env::remove_var("TLS_CERT_FILE");
        env::remove_var("TLS_KEY_FILE");

        assert!(ServerSettings::from_env().is_err());

        env::remove_var("TLS_ENABLED");
    }
}
