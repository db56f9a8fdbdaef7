//! # shop-token
//!
//! Stateless order-session tokens for the storefront checkout.
//!
//! A token carries the buyer's [`OrderIntent`](shop_core::OrderIntent)
//! across page transitions and the payment redirect without any
//! server-side session store. It is signed with HMAC-SHA256 and expires
//! after a fixed lifetime; there is no refresh and no revocation list.
//!
//! - [`codec`] - structural encoding of intent + timestamps
//! - [`authenticator`] - signing, verification and expiry policy
//! - [`config`] - signing secret and lifetime from the environment
//! - [`clock`] - time source seam
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_token::{OrderTokenAuthenticator, TokenConfig};
//!
//! let config = TokenConfig::from_env()?;
//! let tokens = OrderTokenAuthenticator::from_config(&config);
//!
//! // Checkout: hand the token to the browser
//! let token = tokens.issue_order_token(&intent, config.ttl_seconds())?;
//!
//! // After the payment redirect
//! match tokens.verify_order_token(&token) {
//!     Some(intent) => fulfil(intent),
//!     None => reject_as_invalid_or_expired(),
//! }
//! ```

pub mod authenticator;
pub mod clock;
pub mod codec;
pub mod config;

// Re-exports
pub use authenticator::{OrderTokenAuthenticator, SignedToken};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::TokenClaims;
pub use config::{SigningKey, TokenConfig, DEFAULT_TTL_SECS};
