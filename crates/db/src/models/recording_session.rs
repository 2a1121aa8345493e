//! Call-to-record session model.

use dialcast_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Session status values as stored in the `status` column.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}

/// A call-to-record session row.
///
/// Created when a user initiates a "call me and record a message" action;
/// transitions to a terminal status exactly once, driven by the
/// recording-status webhook.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecordingSession {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub to_number: String,
    pub status: String,
    pub call_sid: Option<String>,
    pub recording_sid: Option<String>,
    pub recording_url: Option<String>,
    pub storage_path: Option<String>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RecordingSession {
    /// Whether the session has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status != status::PENDING
    }
}
