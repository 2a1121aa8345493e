//! Repository for the `recording_sessions` table.

use dialcast_core::types::DbId;
use sqlx::PgPool;

use crate::models::recording_session::{status, RecordingSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, to_number, status, call_sid, recording_sid, \
                       recording_url, storage_path, error, created_at, updated_at";

/// Provides persistence for call-to-record sessions.
pub struct RecordingSessionRepo;

impl RecordingSessionRepo {
    /// Insert a new pending session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: Option<DbId>,
        to_number: &str,
    ) -> Result<RecordingSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO recording_sessions (user_id, to_number)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RecordingSession>(&query)
            .bind(user_id)
            .bind(to_number)
            .fetch_one(pool)
            .await
    }

    /// Load a session by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RecordingSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recording_sessions WHERE id = $1");
        sqlx::query_as::<_, RecordingSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record the provider call sid once the call is accepted.
    pub async fn set_call_sid(
        pool: &PgPool,
        id: DbId,
        call_sid: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE recording_sessions SET call_sid = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(call_sid)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition `pending -> completed`, storing the recording details.
    ///
    /// The `status = 'pending'` guard makes the terminal transition a single
    /// conditional update, so duplicate or concurrent webhook deliveries
    /// settle on exactly one winner. Returns `true` only for the winner.
    pub async fn complete_if_pending(
        pool: &PgPool,
        id: DbId,
        recording_sid: &str,
        recording_url: &str,
        storage_path: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE recording_sessions
             SET status = $2, recording_sid = $3, recording_url = $4,
                 storage_path = $5, updated_at = NOW()
             WHERE id = $1 AND status = $6",
        )
        .bind(id)
        .bind(status::COMPLETED)
        .bind(recording_sid)
        .bind(recording_url)
        .bind(storage_path)
        .bind(status::PENDING)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition `pending -> failed`, storing the failure reason. Same
    /// conditional-update contract as [`Self::complete_if_pending`].
    pub async fn fail_if_pending(
        pool: &PgPool,
        id: DbId,
        error: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE recording_sessions
             SET status = $2, error = $3, updated_at = NOW()
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(status::FAILED)
        .bind(error)
        .bind(status::PENDING)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
