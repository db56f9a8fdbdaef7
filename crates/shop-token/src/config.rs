//! # Token Configuration
//!
//! Signing configuration for order tokens.
//! The secret is loaded once from the environment at startup and never
//! changes for the lifetime of the process.

use chrono::Duration;
use shop_core::StorefrontError;
use std::env;

/// Minimum accepted secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime (15 minutes)
pub const DEFAULT_TTL_SECS: i64 = 900;

/// Shared HMAC secret. `Debug` never prints the key material.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Wrap raw key bytes, rejecting secrets shorter than `MIN_SECRET_LEN`
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, StorefrontError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(StorefrontError::Configuration(format!(
                "ORDER_TOKEN_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<{} bytes>)", self.0.len())
    }
}

/// Order token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing key
    pub signing_key: SigningKey,

    /// Lifetime of issued tokens
    pub ttl: Duration,
}

impl TokenConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `ORDER_TOKEN_SECRET`
    ///
    /// Optional env vars:
    /// - `ORDER_TOKEN_TTL_SECS` (default 900)
    pub fn from_env() -> Result<Self, StorefrontError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_values(
            env::var("ORDER_TOKEN_SECRET").ok(),
            env::var("ORDER_TOKEN_TTL_SECS").ok(),
        )
    }

    /// Build configuration from raw values as they appear in the environment
    pub fn from_values(secret: Option<String>, ttl_secs: Option<String>) -> Result<Self, StorefrontError> {
        let secret = secret
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| StorefrontError::Configuration("ORDER_TOKEN_SECRET not set".to_string()))?;

        let signing_key = SigningKey::new(secret.into_bytes())?;

        let ttl_secs = match ttl_secs {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                StorefrontError::Configuration(format!(
                    "ORDER_TOKEN_TTL_SECS must be an integer, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_TTL_SECS,
        };

        let ttl = Duration::try_seconds(ttl_secs)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| {
                StorefrontError::Configuration(
                    "ORDER_TOKEN_TTL_SECS must be a positive number of seconds".to_string(),
                )
            })?;

        Ok(Self { signing_key, ttl })
    }

    /// Create config with explicit values and the default lifetime
    pub fn new(signing_key: SigningKey) -> Self {
        Self {
            signing_key,
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    /// Token lifetime in whole seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }
}
