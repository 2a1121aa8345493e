//! Repository for the `webhook_tokens` table.

use dialcast_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::webhook_token::WebhookToken;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "token, call_sid, session_id, expires_at, created_at";

/// Provides persistence for single-purpose webhook tokens.
pub struct WebhookTokenRepo;

impl WebhookTokenRepo {
    /// Insert a new token row, returning it.
    pub async fn create(
        pool: &PgPool,
        token: &str,
        session_id: Option<DbId>,
        expires_at: Timestamp,
    ) -> Result<WebhookToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO webhook_tokens (token, session_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WebhookToken>(&query)
            .bind(token)
            .bind(session_id)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Whether a non-expired row exists for `token`.
    ///
    /// Read-only: validation never consumes or refreshes a token, so the
    /// provider may retry a callback with the same credential.
    pub async fn is_valid(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let (valid,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM webhook_tokens
                WHERE token = $1 AND expires_at > NOW()
             )",
        )
        .bind(token)
        .fetch_one(pool)
        .await?;
        Ok(valid)
    }

    /// Load a token row regardless of expiry.
    pub async fn find(pool: &PgPool, token: &str) -> Result<Option<WebhookToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM webhook_tokens WHERE token = $1");
        sqlx::query_as::<_, WebhookToken>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Attach the provider call sid to a token. Returns `true` if a row was
    /// updated; a missing row is not an error (best-effort).
    pub async fn attach_call_sid(
        pool: &PgPool,
        token: &str,
        call_sid: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE webhook_tokens SET call_sid = $2 WHERE token = $1")
            .bind(token)
            .bind(call_sid)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a token (rollback after a failed call placement). Returns
    /// `true` if a row was removed.
    pub async fn delete(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM webhook_tokens WHERE token = $1")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all rows past their expiry. Returns the count of deleted rows.
    /// Safe to run concurrently from multiple instances.
    pub async fn sweep_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM webhook_tokens WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
