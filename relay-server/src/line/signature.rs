//! LINE webhook signature verification.
//!
//! LINE signs each webhook request with HMAC-SHA256 over the raw request
//! body, keyed by the channel secret, and sends the base64-encoded digest
//! in the `X-Line-Signature` header.
//! Reference: https://developers.line.biz/en/reference/messaging-api/#signature-validation

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "X-Line-Signature";

/// Verify a LINE webhook signature against the raw request body.
///
/// The scheme has no timestamp component, so there is no staleness window
/// to enforce; the MAC covers the body and nothing else.
///
/// # Returns
///
/// `true` only when the base64-decoded header equals the expected
/// HMAC-SHA256 digest of the body.
pub fn verify_line_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    if channel_secret.is_empty() || signature.is_empty() {
        warn!(
            has_secret = !channel_secret.is_empty(),
            has_signature = !signature.is_empty(),
            "line_signature_missing_fields"
        );
        return false;
    }

    let provided = match STANDARD.decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!(
                signature_length = signature.len(),
                "line_signature_invalid_base64"
            );
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("line_signature_invalid_key");
            return false;
        }
    };

    mac.update(body);
    let expected = mac.finalize().into_bytes();

    // Constant-time comparison to prevent timing attacks
    let valid = constant_time_compare(&expected, &provided);

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = provided.len(),
            "line_signature_mismatch"
        );
    }

    valid
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature_valid() {
        let secret = "test-channel-secret";
        let body = br#"{"destination":"U123","events":[]}"#;

        let signature = sign(secret, body);

        assert!(verify_line_signature(secret, body, &signature));
    }

    #[test]
    fn test_verify_signature_tampered_body() {
        let secret = "test-channel-secret";
        let signature = sign(secret, b"original body");

        assert!(!verify_line_signature(secret, b"tampered body", &signature));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let body = b"payload";
        let signature = sign("other-secret", body);

        assert!(!verify_line_signature("channel-secret", body, &signature));
    }

    #[test]
    fn test_verify_signature_missing_fields() {
        assert!(!verify_line_signature("", b"body", "c2ln"));
        assert!(!verify_line_signature("secret", b"body", ""));
    }

    #[test]
    fn test_verify_signature_not_base64() {
        assert!(!verify_line_signature("secret", b"body", "!!not base64!!"));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"abc", b"abc"));
        assert!(!constant_time_compare(b"abc", b"abd"));
        assert!(!constant_time_compare(b"abc", b"abcd"));
    }
}
