//! Provider request-signature validation.
//!
//! Twilio signs every webhook with `X-Twilio-Signature`: the base64-encoded
//! HMAC-SHA1, keyed by the account auth token, of the full request URL
//! (including query string) concatenated with every POST parameter as
//! `name + value`, sorted by name. Validating the signature proves the
//! request originated from the provider, guarding against a stolen but
//! still-valid webhook token being replayed from elsewhere.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Name of the signature header on provider webhooks.
pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

/// Compute the expected signature for a request.
///
/// `params` are the POST form parameters; pass an empty slice for GET
/// requests. Parameters are sorted by name before concatenation, so callers
/// may pass them in any order.
pub fn compute_signature(auth_token: &str, url: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut payload = url.to_string();
    for (name, value) in sorted {
        payload.push_str(name);
        payload.push_str(value);
    }

    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Validate a provider signature in constant time.
///
/// Returns `false` for malformed base64 as well as signature mismatches; the
/// caller treats both identically (403, no detail).
pub fn validate_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    signature: &str,
) -> bool {
    let Ok(provided) = BASE64.decode(signature) else {
        return false;
    };

    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut payload = url.to_string();
    for (name, value) in sorted {
        payload.push_str(name);
        payload.push_str(value);
    }

    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    mac.verify_slice(&provided).is_ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
