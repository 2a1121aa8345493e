//! Saved audio recording model (library feature).

use dialcast_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A saved recording row from the `saved_recordings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SavedRecording {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub storage_path: String,
    pub duration_secs: Option<i32>,
    pub source_session_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for creating a saved recording.
pub struct CreateSavedRecording {
    pub user_id: DbId,
    pub title: String,
    pub storage_path: String,
    pub duration_secs: Option<i32>,
    pub source_session_id: Option<DbId>,
}
