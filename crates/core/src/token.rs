//! Webhook token generation.
//!
//! A webhook token is an opaque random string embedded as a query credential
//! in the callback URLs handed to the telephony provider. One token
//! authorizes exactly one class of callback; a call-to-record session mints a
//! second, independent token for its recording-status callback so compromise
//! of one does not expose the other.

use rand::Rng;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a generated webhook token (alphanumeric characters).
///
/// 48 alphanumeric characters carry about 286 bits of entropy, above the
/// 256-bit floor required for an unguessable public credential.
pub const TOKEN_LENGTH: usize = 48;

/// Token lifetime in minutes. Tokens self-expire regardless of call outcome,
/// bounding the exposure window of a leaked callback URL.
pub const TOKEN_TTL_MINS: i64 = 60;

/// How often the background sweep deletes expired token rows.
pub const SWEEP_INTERVAL_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a new cryptographically random webhook token.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Compute the absolute expiry timestamp for a token minted now.
pub fn token_expiry(now: crate::types::Timestamp) -> crate::types::Timestamp {
    now + chrono::Duration::minutes(TOKEN_TTL_MINS)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
