//! Periodic deletion of expired webhook tokens.
//!
//! Spawns a loop that deletes `webhook_tokens` rows past their expiry.
//! Token validation already checks `expires_at`, so the sweep is hygiene,
//! not a security boundary: it bounds table growth and keeps leaked-URL
//! exposure rows from accumulating. Deletion is idempotent, so concurrent
//! sweeps from multiple process instances are harmless.

use std::time::Duration;

use dialcast_core::token::SWEEP_INTERVAL_SECS;
use dialcast_db::repositories::WebhookTokenRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the token sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let interval = Duration::from_secs(SWEEP_INTERVAL_SECS);
    tracing::info!(interval_secs = interval.as_secs(), "Token sweep started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Token sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                match WebhookTokenRepo::sweep_expired(&pool).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Token sweep: purged expired tokens");
                        } else {
                            tracing::debug!("Token sweep: nothing to purge");
                        }
                    }
                    Err(e) => {
                        // Storage hiccups must not kill the loop.
                        tracing::error!(error = %e, "Token sweep failed");
                    }
                }
            }
        }
    }
}
