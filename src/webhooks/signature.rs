//! Webhook signature verification using HMAC-SHA256.
//!
//! Deliveries (GitHub's own and the scheduler's `schedule.repository` ticks)
//! are signed with a shared secret. The signature arrives in the
//! `X-Hub-Signature-256` header as `sha256=<hex>` and is checked before the
//! payload is parsed.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Why a delivery's signature was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The header is not `sha256=<hex>`.
    #[error("malformed signature header")]
    Malformed,

    #[error("signature does not match payload")]
    Mismatch,
}

/// Parses a signature header (`sha256=<hex>`) into raw bytes.
///
/// Returns `None` for a missing prefix, another algorithm, or bad hex.
///
/// # Examples
///
/// ```
/// use autorelease_bot::webhooks::parse_signature_header;
///
/// assert_eq!(parse_signature_header("sha256=abcd"), Some(vec![0xab, 0xcd]));
/// assert!(parse_signature_header("sha1=abcd").is_none());
/// assert!(parse_signature_header("sha256=xyz").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    hex::decode(header.strip_prefix("sha256=")?).ok()
}

/// The shared webhook secret.
#[derive(Clone)]
pub struct WebhookSecret(Vec<u8>);

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret(..)")
    }
}

impl WebhookSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        WebhookSecret(secret.into())
    }

    fn mac(&self, payload: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.0).expect("HMAC can take key of any size");
        mac.update(payload);
        mac
    }

    /// Signs `payload`, returning the header value a sender would attach.
    ///
    /// # Examples
    ///
    /// ```
    /// use autorelease_bot::webhooks::WebhookSecret;
    ///
    /// let secret = WebhookSecret::new("It's a Secret to Everybody");
    /// let header = secret.sign(b"Hello, World!");
    /// assert!(header.starts_with("sha256="));
    /// assert!(secret.verify(b"Hello, World!", &header).is_ok());
    /// assert!(WebhookSecret::new("other").verify(b"Hello, World!", &header).is_err());
    /// ```
    pub fn sign(&self, payload: &[u8]) -> String {
        format!(
            "sha256={}",
            hex::encode(self.mac(payload).finalize().into_bytes())
        )
    }

    /// Verifies a signature header against `payload` in constant time.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), SignatureError> {
        let expected = parse_signature_header(header).ok_or(SignatureError::Malformed)?;
        self.mac(payload)
            .verify_slice(&expected)
            .map_err(|_| SignatureError::Mismatch)
    }
}
