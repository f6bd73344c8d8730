//! LINE webhook signature verification.
//!
//! LINE signs each webhook request body with the channel secret.
//! Reference: https://developers.line.biz/en/docs/messaging-api/receiving-messages/#verify-webhook-signature

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Verify a LINE webhook signature.
///
/// The `X-Line-Signature` header holds the Base64-encoded HMAC-SHA256
/// digest of the raw request body, keyed with the channel secret.
///
/// # Returns
///
/// `true` if the signature matches the body, `false` otherwise.
pub fn verify_line_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    if channel_secret.is_empty() || signature.is_empty() {
        warn!(
            has_channel_secret = !channel_secret.is_empty(),
            has_signature = !signature.is_empty(),
            "line_signature_missing_fields"
        );
        return false;
    }

    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("line_signature_invalid_key");
            return false;
        }
    };

    mac.update(body);

    let expected_signature = STANDARD.encode(mac.finalize().into_bytes());

    // Constant-time comparison to prevent timing attacks
    let valid = constant_time_compare(&expected_signature, signature.trim());

    if !valid {
        warn!(
            expected_length = expected_signature.len(),
            actual_length = signature.len(),
            "line_signature_mismatch"
        );
    }

    valid
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check if LINE signature verification is enabled.
pub fn is_signature_verification_enabled(channel_secret: &Option<String>) -> bool {
    channel_secret
        .as_ref()
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).unwrap();
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}
