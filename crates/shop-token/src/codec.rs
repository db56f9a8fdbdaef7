//! # Token Codec
//!
//! Reversible mapping between an [`OrderIntent`] plus its timing metadata
//! and a single transport-safe string:
//!
//! ```text
//! <schema>.<issued_at>.<expires_at>.<intent>
//!    1    . 1700000000 . 1700000900 . eyJwcm9kdWN0Ijp7...
//! ```
//!
//! `issued_at` and `expires_at` are unix seconds in ASCII digits, `intent`
//! is the intent JSON in URL-safe unpadded base64. Every character of the
//! output is in `[A-Za-z0-9_.-]`, so it can go into a query string or a
//! hidden form field as-is.
//!
//! The codec checks structure only. Integrity and expiry belong to the
//! [`authenticator`](crate::authenticator).

use base64::{engine::general_purpose, Engine};
use shop_core::{OrderIntent, TokenError, TokenResult};

/// Payload schema version written into every token
pub const SCHEMA_VERSION: &str = "1";

/// Separator between payload fields
pub const FIELD_SEPARATOR: char = '.';

const FIELD_COUNT: usize = 4;

/// Decoded contents of a token payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub intent: OrderIntent,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds
    pub expires_at: i64,
}

impl TokenClaims {
    /// Whether the token is past its lifetime at `now` (unix seconds)
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// Encode an intent and its lifetime into a payload string.
///
/// The intent must be complete and `expires_at` strictly after `issued_at`.
pub fn encode(intent: &OrderIntent, issued_at: i64, expires_at: i64) -> TokenResult<String> {
    intent
        .validate()
        .map_err(|e| TokenError::InvalidClaims(e.to_string()))?;

    if issued_at < 0 {
        return Err(TokenError::InvalidClaims(
            "issued_at must not be before the unix epoch".to_string(),
        ));
    }
    if expires_at <= issued_at {
        return Err(TokenError::InvalidClaims(
            "expires_at must be after issued_at".to_string(),
        ));
    }

    let json = serde_json::to_vec(intent).map_err(|e| TokenError::InvalidClaims(e.to_string()))?;
    let intent_b64 = general_purpose::URL_SAFE_NO_PAD.encode(json);

    Ok(format!(
        "{}{sep}{}{sep}{}{sep}{}",
        SCHEMA_VERSION,
        issued_at,
        expires_at,
        intent_b64,
        sep = FIELD_SEPARATOR
    ))
}

/// Decode a payload string produced by [`encode`].
pub fn decode(payload: &str) -> TokenResult<TokenClaims> {
    let fields: Vec<&str> = payload.split(FIELD_SEPARATOR).collect();
    let [version, issued_at, expires_at, intent] = fields.as_slice() else {
        return Err(malformed(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            fields.len()
        )));
    };

    if *version != SCHEMA_VERSION {
        return Err(malformed("unsupported schema version"));
    }

    let issued_at = parse_timestamp(issued_at, "issued_at")?;
    let expires_at = parse_timestamp(expires_at, "expires_at")?;
    if expires_at <= issued_at {
        return Err(malformed("expires_at is not after issued_at"));
    }

    if intent.is_empty() {
        return Err(malformed("empty intent"));
    }
    let json = general_purpose::URL_SAFE_NO_PAD
        .decode(intent)
        .map_err(|e| malformed(format!("intent is not base64url: {}", e)))?;
    let intent: OrderIntent = serde_json::from_slice(&json)
        .map_err(|e| malformed(format!("intent does not match schema: {}", e)))?;
    intent
        .validate()
        .map_err(|e| malformed(format!("incomplete intent: {}", e)))?;

    Ok(TokenClaims {
        intent,
        issued_at,
        expires_at,
    })
}

fn parse_timestamp(field: &str, name: &str) -> TokenResult<i64> {
    // `str::parse` would also accept a sign prefix
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(format!("{} is not numeric", name)));
    }
    field
        .parse::<i64>()
        .map_err(|_| malformed(format!("{} is out of range", name)))
}

fn malformed(reason: impl Into<String>) -> TokenError {
    TokenError::Malformed(reason.into())
}
