//! HTTP server configuration from the environment.

use std::env;
use std::net::SocketAddr;

use url::Url;

use crate::domain::session::DEFAULT_SESSION_TTL_SECS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration read once at boot.
///
/// Backend selection is driven by which variables are present: a
/// `DATABASE_URL` wins, then a managed backend URL/key pair, then the
/// in-memory fallback.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub managed_backend_url: Option<Url>,
    pub managed_backend_key: Option<String>,
    pub cookie_secure: bool,
    pub session_ttl_secs: i64,
}

/// Errors raised while reading the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::invalid("BIND_ADDR", err.to_string()))?;
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let managed_backend_url = match env::var("MANAGED_BACKEND_URL").ok().filter(|v| !v.is_empty())
        {
            Some(raw) => Some(
                Url::parse(&raw)
                    .map_err(|err| ConfigError::invalid("MANAGED_BACKEND_URL", err.to_string()))?,
            ),
            None => None,
        };
        let managed_backend_key = env::var("MANAGED_BACKEND_KEY").ok().filter(|v| !v.is_empty());
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| v != "0")
            .unwrap_or(true);
        let session_ttl_secs = match env::var("SESSION_TTL_SECS").ok().filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::invalid("SESSION_TTL_SECS", "must be a positive integer")
                })?,
            None => DEFAULT_SESSION_TTL_SECS,
        };
        Ok(Self {
            bind_addr,
            database_url,
            managed_backend_url,
            managed_backend_key,
            cookie_secure,
            session_ttl_secs,
        })
    }
}
