//! Environment-driven configuration.
//!
//! The `env_*` helpers never fail: an absent, empty or unparsable variable
//! yields the supplied default.

use crate::error::{QeError, QeResult};
use std::time::Duration;

/// A string variable, or `default` when unset or empty.
pub fn env_str(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// An integer variable, or `default` when unset, empty or not an integer.
pub fn env_int(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// A boolean variable.
///
/// `true` and `false` (any case) are recognised; anything else is `default`.
pub fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) if value.trim().eq_ignore_ascii_case("true") => true,
        Ok(value) if value.trim().eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}

/// A JSON string array such as `["a","b"]`, or `default`.
pub fn env_str_array(key: &str, default: &[&str]) -> Vec<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .and_then(|v| serde_json::from_str(&v).ok())
        .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
}

/// Connection and cache settings.
#[derive(Debug, Clone, PartialEq)]
pub struct QeConfig {
    /// `DATABASE_URL`
    pub database_url: String,
    /// `REDIS_URL`
    pub redis_url: Option<String>,
    /// `QE_CACHE_TTL_SECS`, `0` disables expiry
    pub cache_ttl: Option<Duration>,
    /// `QE_POOL_MAX_SIZE`
    pub pool_max_size: usize,
}

impl QeConfig {
    pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;
    pub const DEFAULT_POOL_MAX_SIZE: i64 = 16;

    /// Read settings from the environment, loading `.env` first if present.
    pub fn from_env() -> QeResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_current_env()
    }

    /// Read settings from the process environment only.
    pub fn from_current_env() -> QeResult<Self> {
        let database_url = env_str("DATABASE_URL", "");
        if database_url.is_empty() {
            return Err(QeError::Config("DATABASE_URL is not set".to_string()));
        }

        let redis_url = Some(env_str("REDIS_URL", "")).filter(|s| !s.is_empty());

        let ttl_secs = env_int("QE_CACHE_TTL_SECS", Self::DEFAULT_CACHE_TTL_SECS);
        let cache_ttl = match u64::try_from(ttl_secs) {
            Ok(0) => None,
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => {
                return Err(QeError::Config(format!(
                    "QE_CACHE_TTL_SECS must not be negative, got {ttl_secs}"
                )));
            }
        };

        let max_size = env_int("QE_POOL_MAX_SIZE", Self::DEFAULT_POOL_MAX_SIZE);
        let pool_max_size = usize::try_from(max_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                QeError::Config(format!("QE_POOL_MAX_SIZE must be positive, got {max_size}"))
            })?;

        Ok(Self {
            database_url,
            redis_url,
            cache_ttl,
            pool_max_size,
        })
    }
}
