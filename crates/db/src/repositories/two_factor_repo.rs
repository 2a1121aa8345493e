//! Repository for the `two_factor_challenges` table.

use dialcast_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::two_factor::TwoFactorChallenge;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "user_id, code, method, attempts, expires_at, created_at";

/// Provides persistence for outstanding two-factor challenges.
pub struct TwoFactorRepo;

impl TwoFactorRepo {
    /// Create or replace the challenge for a user, resetting the attempt
    /// counter. Re-sending a code always supersedes the previous one.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        code: &str,
        method: &str,
        expires_at: Timestamp,
    ) -> Result<TwoFactorChallenge, sqlx::Error> {
        let query = format!(
            "INSERT INTO two_factor_challenges (user_id, code, method, expires_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE
             SET code = $2, method = $3, attempts = 0,
                 expires_at = $4, created_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TwoFactorChallenge>(&query)
            .bind(user_id)
            .bind(code)
            .bind(method)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Load the outstanding challenge for a user, if any.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<TwoFactorChallenge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM two_factor_challenges WHERE user_id = $1");
        sqlx::query_as::<_, TwoFactorChallenge>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Increment the failed-attempt counter, returning the new count.
    /// Returns `None` when no challenge exists, which callers treat as
    /// already consumed or invalidated.
    pub async fn increment_attempts(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "UPDATE two_factor_challenges
             SET attempts = attempts + 1
             WHERE user_id = $1
             RETURNING attempts",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(attempts,)| attempts))
    }

    /// Remove a user's challenge (consumed on success, or invalidated after
    /// too many failures). Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM two_factor_challenges WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
