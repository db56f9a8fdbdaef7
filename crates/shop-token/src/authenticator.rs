//! # Token Authenticator
//!
//! Issues and verifies signed order tokens. This is the only component that
//! holds the signing secret.
//!
//! A token is the codec payload followed by a lowercase hex HMAC-SHA256 tag:
//!
//! ```text
//! 1.1700000000.1700000900.eyJwcm9kdWN0Ijp7...  .  3f9a...c41e
//! └──────────────── payload ─────────────────┘    └── tag ──┘
//! ```
//!
//! Verification short-circuits in this order: structure, tag, payload
//! decode, expiry. Callers that face clients use
//! [`OrderTokenAuthenticator::verify_order_token`], which collapses every
//! failure into `None`.

use crate::clock::{Clock, SystemClock};
use crate::codec;
use crate::config::{SigningKey, TokenConfig};
use chrono::Duration;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shop_core::{OrderIntent, TokenError, TokenResult};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

type HmacSha256 = Hmac<Sha256>;

/// Length of the hex-encoded HMAC-SHA256 tag
pub const TAG_LEN: usize = 64;

/// Separator between payload and tag
const TAG_SEPARATOR: char = '.';

/// A freshly issued token and the unix second it stops being accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: i64,
}

/// Signs and verifies order tokens.
///
/// Holds no mutable state, so one instance can be shared across any number
/// of request tasks behind an `Arc`.
pub struct OrderTokenAuthenticator {
    mac: HmacSha256,
    clock: Arc<dyn Clock>,
}

impl OrderTokenAuthenticator {
    /// Create an authenticator using the system clock
    pub fn new(key: &SigningKey) -> Self {
        Self::with_clock(key, Arc::new(SystemClock))
    }

    /// Create an authenticator with an explicit time source
    pub fn with_clock(key: &SigningKey, clock: Arc<dyn Clock>) -> Self {
        let mac = HmacSha256::new_from_slice(key.as_bytes())
            .expect("HMAC can take key of any size");

        Self { mac, clock }
    }

    /// Create from token configuration
    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(&config.signing_key)
    }

    /// Issue a token carrying `intent`, valid for `ttl` from now.
    ///
    /// # Panics
    /// If `ttl` is shorter than one second. A non-positive lifetime is a
    /// programming error, not a request error.
    pub fn issue(&self, intent: &OrderIntent, ttl: Duration) -> TokenResult<String> {
        self.sign(intent, ttl).map(|signed| signed.token)
    }

    #[instrument(skip(self, intent), fields(product_id = %intent.product.product_id))]
    fn sign(&self, intent: &OrderIntent, ttl: Duration) -> TokenResult<SignedToken> {
        assert!(
            ttl.num_seconds() > 0,
            "order token ttl must be at least one second, got {}ms",
            ttl.num_milliseconds()
        );

        let issued_at = self.clock.now().timestamp();
        let expires_at = issued_at
            .checked_add(ttl.num_seconds())
            .ok_or_else(|| TokenError::InvalidClaims("ttl overflows the timestamp".to_string()))?;

        let payload = codec::encode(intent, issued_at, expires_at)?;
        let tag = self.tag(&payload);

        debug!(
            issued_at,
            expires_at,
            tag = fingerprint(&tag),
            "Issued order token"
        );

        Ok(SignedToken {
            token: format!("{}{}{}", payload, TAG_SEPARATOR, tag),
            expires_at,
        })
    }

    /// Verify a token and return the intent it carries.
    ///
    /// The error kind is for diagnostics only and must not reach clients.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> TokenResult<OrderIntent> {
        let (payload, tag) = split_token(token)?;

        let expected = self.tag(payload);
        if !constant_time_compare(tag, &expected) {
            return Err(TokenError::Tampered);
        }

        let claims = codec::decode(payload)?;

        let now = self.clock.now().timestamp();
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired {
                expired_at: claims.expires_at,
            });
        }

        debug!(
            expires_at = claims.expires_at,
            tag = fingerprint(tag),
            "Verified order token"
        );

        Ok(claims.intent)
    }

    /// Issue a token for the checkout flow with a lifetime in seconds.
    ///
    /// # Panics
    /// If `ttl_seconds` is not positive.
    pub fn issue_order_token(&self, intent: &OrderIntent, ttl_seconds: i64) -> TokenResult<String> {
        self.issue_signed_order_token(intent, ttl_seconds)
            .map(|signed| signed.token)
    }

    /// Same as [`issue_order_token`](Self::issue_order_token), also returning
    /// the expiry stamped into the token.
    ///
    /// # Panics
    /// If `ttl_seconds` is not positive.
    pub fn issue_signed_order_token(
        &self,
        intent: &OrderIntent,
        ttl_seconds: i64,
    ) -> TokenResult<SignedToken> {
        assert!(
            ttl_seconds > 0,
            "order token ttl must be positive, got {}s",
            ttl_seconds
        );
        let ttl = Duration::try_seconds(ttl_seconds)
            .ok_or_else(|| TokenError::InvalidClaims("ttl is out of range".to_string()))?;

        self.sign(intent, ttl)
    }

    /// Verify a token presented by a client.
    ///
    /// Malformed, tampered and expired tokens all yield `None`.
    #[instrument(skip_all)]
    pub fn verify_order_token(&self, token: &str) -> Option<OrderIntent> {
        match self.verify(token) {
            Ok(intent) => Some(intent),
            Err(err @ TokenError::Expired { .. }) => {
                debug!(kind = err.kind(), "Order token rejected: {}", err);
                None
            }
            Err(err) => {
                warn!(kind = err.kind(), "Order token rejected: {}", err);
                None
            }
        }
    }

    fn tag(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for OrderTokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderTokenAuthenticator").finish_non_exhaustive()
    }
}

fn split_token(token: &str) -> TokenResult<(&str, &str)> {
    let (payload, tag) = token
        .rsplit_once(TAG_SEPARATOR)
        .ok_or_else(|| TokenError::Malformed("missing tag separator".to_string()))?;

    if payload.is_empty() {
        return Err(TokenError::Malformed("empty payload".to_string()));
    }
    if tag.len() != TAG_LEN {
        return Err(TokenError::Malformed(format!(
            "tag must be {} characters, found {}",
            TAG_LEN,
            tag.len()
        )));
    }

    Ok((payload, tag))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Leading tag characters, enough to correlate log lines
fn fingerprint(tag: &str) -> &str {
    tag.get(..12).unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::DateTime;
    use shop_core::{Contact, Currency, Price, ProductRef, SelectedVariant};

    const SECRET: &[u8] = b"storefront-test-secret-0123456789abcdef";
    const START: i64 = 1_700_000_000;

    fn key() -> SigningKey {
        SigningKey::new(SECRET.to_vec()).unwrap()
    }

    fn setup() -> (OrderTokenAuthenticator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(DateTime::from_timestamp(START, 0).unwrap()));
        let auth = OrderTokenAuthenticator::with_clock(&key(), clock.clone());
        (auth, clock)
    }

    fn netflix_intent() -> OrderIntent {
        OrderIntent::new(
            ProductRef::new("netflix-account"),
            SelectedVariant {
                label: "1 Month".into(),
                duration: "1 Month".into(),
                price: Price::new(42500, Currency::INR),
            },
            Contact::email("a@b.com"),
        )
    }

    fn topup_intent() -> OrderIntent {
        let mut product = ProductRef::new("free-fire-diamonds");
        product.platform = Some("free-fire".into());
        product.product_type = Some("topup".into());

        OrderIntent::new(
            product,
            SelectedVariant {
                label: "520 Diamonds".into(),
                duration: "Instant".into(),
                price: Price::new(75000, Currency::IDR),
            },
            Contact::default().with_phone("+628120000000"),
        )
        .with_option("game_user_id", "88112233")
        .with_option("zone_id", "2041")
    }

    /// Replace the character at `index` with a different URL-safe character
    fn flip_char(token: &str, index: usize) -> String {
        let mut chars: Vec<char> = token.chars().collect();
        chars[index] = match chars[index] {
            'A' => 'B',
            _ => 'A',
        };
        chars.into_iter().collect()
    }

    #[test]
    fn test_round_trip() {
        let (auth, _) = setup();

        for intent in [netflix_intent(), topup_intent()] {
            let token = auth.issue(&intent, Duration::seconds(900)).unwrap();
            assert_eq!(auth.verify(&token).unwrap(), intent);
        }
    }

    #[test]
    fn test_netflix_scenario() {
        let (auth, clock) = setup();
        let intent = netflix_intent();

        let token = auth.issue_order_token(&intent, 900).unwrap();
        assert_eq!(auth.verify_order_token(&token), Some(intent));

        clock.advance(Duration::seconds(901));
        assert_eq!(auth.verify_order_token(&token), None);
    }

    #[test]
    fn test_signed_token_reports_its_expiry() {
        let (auth, _) = setup();
        let signed = auth.issue_signed_order_token(&netflix_intent(), 900).unwrap();

        assert_eq!(signed.expires_at, START + 900);

        let (payload, _) = signed.token.rsplit_once('.').unwrap();
        let claims = codec::decode(payload).unwrap();
        assert_eq!(claims.issued_at, START);
        assert_eq!(claims.expires_at, signed.expires_at);
    }

    #[test]
    fn test_verify_runs_inside_a_span() {
        use std::sync::Mutex;
        use tracing::span;
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        struct SpanNames(Arc<Mutex<Vec<&'static str>>>);

        impl<S: tracing::Subscriber> Layer<S> for SpanNames {
            fn on_new_span(&self, attrs: &span::Attributes<'_>, _: &span::Id, _: Context<'_, S>) {
                self.0.lock().unwrap().push(attrs.metadata().name());
            }
        }

        let (auth, _) = setup();
        let names = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(SpanNames(names.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let token = auth.issue_order_token(&netflix_intent(), 900).unwrap();
            assert!(auth.verify_order_token(&token).is_some());
            assert_eq!(auth.verify_order_token("not-a-token"), None);
        });

        let names = names.lock().unwrap();
        assert!(names.contains(&"sign"), "{:?}", names);
        assert!(names.contains(&"verify"), "{:?}", names);
        assert!(names.contains(&"verify_order_token"), "{:?}", names);
    }

    #[test]
    fn test_expiry_boundary() {
        let (auth, clock) = setup();
        let token = auth.issue(&netflix_intent(), Duration::seconds(900)).unwrap();

        clock.advance(Duration::seconds(899));
        assert!(auth.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(
            auth.verify(&token),
            Err(TokenError::Expired {
                expired_at: START + 900
            })
        );
    }

    #[test]
    fn test_token_is_transport_safe() {
        let (auth, _) = setup();
        let token = auth.issue(&topup_intent(), Duration::seconds(60)).unwrap();

        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')));

        let (_, tag) = token.rsplit_once('.').unwrap();
        assert_eq!(tag.len(), TAG_LEN);
    }

    #[test]
    fn test_flipping_any_payload_character_fails() {
        let (auth, _) = setup();
        let token = auth.issue(&netflix_intent(), Duration::seconds(900)).unwrap();
        let payload_len = token.len() - TAG_LEN - 1;

        for i in 0..payload_len {
            let forged = flip_char(&token, i);
            assert!(auth.verify(&forged).is_err(), "forged token accepted at {}", i);
            assert_eq!(auth.verify_order_token(&forged), None);
        }
    }

    #[test]
    fn test_flipping_any_tag_character_fails() {
        let (auth, _) = setup();
        let token = auth.issue(&netflix_intent(), Duration::seconds(900)).unwrap();

        for i in (token.len() - TAG_LEN - 1)..token.len() {
            let forged = flip_char(&token, i);
            assert!(auth.verify(&forged).is_err(), "forged tag accepted at {}", i);
        }
    }

    #[test]
    fn test_uppercased_tag_fails() {
        let (auth, _) = setup();
        let token = auth.issue(&netflix_intent(), Duration::seconds(900)).unwrap();
        let (payload, tag) = token.rsplit_once('.').unwrap();

        let shouting = format!("{}.{}", payload, tag.to_uppercase());
        assert_eq!(auth.verify(&shouting), Err(TokenError::Tampered));
    }

    #[test]
    fn test_other_key_is_tampered() {
        let (auth, _) = setup();
        let token = auth.issue(&netflix_intent(), Duration::seconds(900)).unwrap();

        let other = OrderTokenAuthenticator::new(
            &SigningKey::new(b"another-secret-another-secret-0123".to_vec()).unwrap(),
        );
        assert_eq!(other.verify(&token), Err(TokenError::Tampered));
    }

    #[test]
    fn test_structurally_wrong_tokens_are_malformed() {
        let (auth, _) = setup();

        for bad in [
            "",
            "no-separator-at-all",
            ".0000000000000000000000000000000000000000000000000000000000000000",
            "1.1700000000.1700000900.e30.short",
        ] {
            assert!(
                matches!(auth.verify(bad), Err(TokenError::Malformed(_))),
                "{:?}",
                bad
            );
            assert_eq!(auth.verify_order_token(bad), None);
        }
    }

    #[test]
    fn test_signed_garbage_is_malformed() {
        let (auth, _) = setup();

        for payload in [
            "1.soon.1700000900.e30",
            "1.1700000000.1700000900",
            "2.1700000000.1700000900.e30",
            "1.1700000000.1700000900.e30",
        ] {
            let token = format!("{}.{}", payload, auth.tag(payload));
            assert!(
                matches!(auth.verify(&token), Err(TokenError::Malformed(_))),
                "{:?}",
                payload
            );
        }
    }

    #[test]
    fn test_failures_are_indistinguishable_externally() {
        let (auth, clock) = setup();
        let token = auth.issue(&netflix_intent(), Duration::seconds(900)).unwrap();

        let malformed = "definitely not a token";
        let tampered = flip_char(&token, 5);
        clock.advance(Duration::seconds(3600));

        assert!(matches!(auth.verify(malformed), Err(TokenError::Malformed(_))));
        assert_eq!(auth.verify(&tampered), Err(TokenError::Tampered));
        assert!(matches!(auth.verify(&token), Err(TokenError::Expired { .. })));

        assert_eq!(auth.verify_order_token(malformed), None);
        assert_eq!(auth.verify_order_token(&tampered), None);
        assert_eq!(auth.verify_order_token(&token), None);
    }

    #[test]
    fn test_issue_rejects_incomplete_intent() {
        let (auth, _) = setup();
        let mut intent = netflix_intent();
        intent.variant.label.clear();

        assert!(matches!(
            auth.issue(&intent, Duration::seconds(900)),
            Err(TokenError::InvalidClaims(_))
        ));
    }

    #[test]
    #[should_panic(expected = "ttl must be")]
    fn test_zero_ttl_panics() {
        let (auth, _) = setup();
        let _ = auth.issue(&netflix_intent(), Duration::zero());
    }

    #[test]
    #[should_panic(expected = "ttl must be positive")]
    fn test_negative_ttl_seconds_panics() {
        let (auth, _) = setup();
        let _ = auth.issue_order_token(&netflix_intent(), -1);
    }

    #[test]
    fn test_shared_across_threads() {
        let auth = Arc::new(OrderTokenAuthenticator::new(&key()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let auth = Arc::clone(&auth);
                std::thread::spawn(move || {
                    let intent = netflix_intent().with_option("attempt", i.to_string());
                    let token = auth.issue_order_token(&intent, 60).unwrap();
                    auth.verify_order_token(&token) == Some(intent)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
