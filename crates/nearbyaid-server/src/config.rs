//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use nearbyaid_shared::constants::DEFAULT_HTTP_PORT;

/// Signing secret used when `JWT_SECRET` is unset. Development only.
const DEV_JWT_SECRET: &str = "nearbyaid-dev-secret-change-me";

/// Upper bound for `TOKEN_TTL_DAYS`.
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Deployment flavour. Controls whether 500 responses carry error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn exposes_error_detail(&self) -> bool {
        matches!(self, Environment::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`, or `PORT` to change only the port.
    /// Default: `0.0.0.0:5000`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `./nearbyaid.db`
    pub database_path: PathBuf,

    /// Shared secret for signing and verifying bearer tokens (HS256).
    /// Env: `JWT_SECRET`
    /// Default: a fixed development secret.
    pub jwt_secret: String,

    /// Lifetime of issued tokens in days.
    /// Env: `TOKEN_TTL_DAYS`
    /// Default: `30`
    pub token_ttl_days: i64,

    /// Env: `APP_ENV` (development/production)
    /// Default: `development`
    pub environment: Environment,

    /// Single origin allowed by CORS. `None` allows any origin.
    /// Env: `CORS_ALLOW_ORIGIN`
    pub cors_allow_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: PathBuf::from("./nearbyaid.db"),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_days: 30,
            environment: Environment::Development,
            cors_allow_origin: None,
        }
    }
}

// The secret must never reach the logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_addr", &self.http_addr)
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_days", &self.token_ttl_days)
            .field("environment", &self.environment)
            .field("cors_allow_origin", &self.cors_allow_origin)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(port) = lookup("PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.http_addr.set_port(port),
                Err(_) => tracing::warn!(value = %port, "Invalid PORT, ignoring"),
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => config.jwt_secret = secret,
            _ => tracing::warn!("JWT_SECRET not set, using development secret"),
        }

        if let Some(val) = lookup("TOKEN_TTL_DAYS") {
            match val.parse::<i64>() {
                Ok(days) if (1..=MAX_TOKEN_TTL_DAYS).contains(&days) => {
                    config.token_ttl_days = days
                }
                _ => tracing::warn!(value = %val, "Invalid TOKEN_TTL_DAYS, using default"),
            }
        }

        if let Some(val) = lookup("APP_ENV") {
            match Environment::parse(&val) {
                Some(env) => config.environment = env,
                None => tracing::warn!(value = %val, "Unknown APP_ENV, using development"),
            }
        }

        if let Some(origin) = lookup("CORS_ALLOW_ORIGIN") {
            if !origin.is_empty() && origin != "*" {
                config.cors_allow_origin = Some(origin);
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 5000).into());
        assert_eq!(config.environment, Environment::Development);
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("PORT", "7000"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_DAYS", "7"),
            ("APP_ENV", "Production"),
            ("CORS_ALLOW_ORIGIN", "https://nearbyaid.example"),
        ]));
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 7000).into());
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl_days, 7);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(
            config.cors_allow_origin.as_deref(),
            Some("https://nearbyaid.example")
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HTTP_ADDR", "not-an-addr"),
            ("TOKEN_TTL_DAYS", "-3"),
            ("APP_ENV", "staging"),
            ("CORS_ALLOW_ORIGIN", "*"),
        ]));
        assert_eq!(config.http_addr, ServerConfig::default().http_addr);
        assert_eq!(config.token_ttl_days, 30);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.cors_allow_origin.is_none());
    }

    #[test]
    fn test_oversized_token_ttl_falls_back() {
        for val in ["3651", "100000000", "9223372036854775807"] {
            let config = ServerConfig::from_lookup(lookup(&[("TOKEN_TTL_DAYS", val)]));
            assert_eq!(config.token_ttl_days, 30, "{val}");
        }
        let config = ServerConfig::from_lookup(lookup(&[("TOKEN_TTL_DAYS", "3650")]));
        assert_eq!(config.token_ttl_days, MAX_TOKEN_TTL_DAYS);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ServerConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")]));
        assert!(!format!("{config:?}").contains("s3cret"));
    }
}
