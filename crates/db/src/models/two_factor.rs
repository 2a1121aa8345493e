//! Two-factor challenge model.

use dialcast_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Delivery method values as stored in the `method` column.
pub mod method {
    pub const SMS: &str = "sms";
    pub const PHONE_CALL: &str = "phone_call";
}

/// An outstanding two-factor challenge for a user.
///
/// At most one per user (the user id is the primary key); re-sending a code
/// replaces the previous challenge and resets the attempt counter.
#[derive(Debug, Clone, FromRow)]
pub struct TwoFactorChallenge {
    pub user_id: DbId,
    pub code: String,
    pub method: String,
    pub attempts: i32,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl TwoFactorChallenge {
    /// Whether the challenge is still inside its validity window.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}
