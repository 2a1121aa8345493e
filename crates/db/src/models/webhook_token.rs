//! Webhook token model.

use dialcast_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A webhook token row from the `webhook_tokens` table.
///
/// The token string itself is the primary key; `call_sid` is attached once
/// the provider accepts the call, and `session_id` binds tokens minted for a
/// call-to-record session.
#[derive(Debug, Clone, FromRow)]
pub struct WebhookToken {
    pub token: String,
    pub call_sid: Option<String>,
    pub session_id: Option<DbId>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}
