//! Repository for the `saved_recordings` table.

use dialcast_core::types::DbId;
use sqlx::PgPool;

use crate::models::saved_recording::{CreateSavedRecording, SavedRecording};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, title, storage_path, duration_secs, source_session_id, created_at";

/// Provides persistence for the reusable recording library.
pub struct SavedRecordingRepo;

impl SavedRecordingRepo {
    /// Insert a saved recording, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSavedRecording,
    ) -> Result<SavedRecording, sqlx::Error> {
        let query = format!(
            "INSERT INTO saved_recordings
                 (user_id, title, storage_path, duration_secs, source_session_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SavedRecording>(&query)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.storage_path)
            .bind(input.duration_secs)
            .bind(input.source_session_id)
            .fetch_one(pool)
            .await
    }

    /// List a user's saved recordings, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SavedRecording>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM saved_recordings
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, SavedRecording>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
