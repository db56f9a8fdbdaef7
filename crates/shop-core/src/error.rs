//! # Storefront Error Types
//!
//! Typed error handling for the storefront backend.
//! Token operations return `Result<T, TokenError>`, everything else
//! returns `Result<T, StorefrontError>`.

use thiserror::Error;

/// Failure kinds of the order-token mechanism.
///
/// The distinction between the kinds is for internal diagnostics only.
/// Anything crossing the HTTP boundary is flattened into one generic
/// "invalid or expired" outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token does not have the expected structure
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Integrity tag does not match the payload
    #[error("Token integrity check failed")]
    Tampered,

    /// Token lifetime is over
    #[error("Token expired at {expired_at}")]
    Expired { expired_at: i64 },

    /// Claims handed to the encoder are incomplete or inconsistent
    #[error("Invalid token claims: {0}")]
    InvalidClaims(String),
}

impl TokenError {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed(_) => "malformed",
            TokenError::Tampered => "tampered",
            TokenError::Expired { .. } => "expired",
            TokenError::InvalidClaims(_) => "invalid_claims",
        }
    }
}

/// Result type alias for token operations
pub type TokenResult<T> = Result<T, TokenError>;

/// Core error type for storefront operations
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration errors (missing secret, invalid TTL, bad catalog)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Product exists but has no variant with that label
    #[error("Variant '{label}' not found for product {product_id}")]
    VariantNotFound { product_id: String, label: String },

    /// Order token rejected
    #[error("Invalid or expired order token")]
    InvalidToken(#[from] TokenError),

    /// Catalog backend failure
    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl StorefrontError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StorefrontError::Configuration(_) => 500,
            StorefrontError::InvalidRequest(_) => 400,
            StorefrontError::ProductNotFound { .. } => 404,
            StorefrontError::VariantNotFound { .. } => 404,
            StorefrontError::InvalidToken(_) => 401,
            StorefrontError::Catalog(_) => 503,
        }
    }
}

/// Result type alias for storefront operations
pub type StorefrontResult<T> = Result<T, StorefrontError>;
