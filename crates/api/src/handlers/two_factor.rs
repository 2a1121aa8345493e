//! Handlers for two-factor code delivery and verification.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use dialcast_core::error::CoreError;
use dialcast_core::otp::{generate_code, mask_destination, CHALLENGE_TTL_MINS, MAX_VERIFY_ATTEMPTS};
use dialcast_core::types::DbId;
use dialcast_db::models::two_factor::method;
use dialcast_db::repositories::TwoFactorRepo;
use dialcast_telephony::provider::ProviderError;
use serde::{Deserialize, Serialize};

use crate::dispatch::{dispatch_call, CallVariant};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /2fa/send`.
#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub user_id: DbId,
    /// Destination phone number, read from the user store by the caller.
    pub phone_number: String,
    /// `"sms"` or `"phone_call"`.
    pub method: String,
}

/// Response for `POST /2fa/send`: a user-safe description of where the code
/// went, never the code itself.
#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    pub method: String,
    pub masked_destination: String,
}

/// Request body for `POST /2fa/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub user_id: DbId,
    pub code: String,
}

/// Response for `POST /2fa/verify`.
#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/2fa/send
///
/// Generate a one-time code, store it as the user's outstanding challenge
/// (10-minute expiry), and deliver it by SMS or voice call.
pub async fn send_code(
    State(state): State<AppState>,
    Json(input): Json<SendCodeRequest>,
) -> AppResult<Json<SendCodeResponse>> {
    if input.phone_number.trim().is_empty() {
        return Err(CoreError::Validation("phone number must not be empty".into()).into());
    }
    if input.method != method::SMS && input.method != method::PHONE_CALL {
        return Err(CoreError::Validation(format!(
            "unknown delivery method: {}",
            input.method
        ))
        .into());
    }

    let code = generate_code();
    let expires_at = Utc::now() + Duration::minutes(CHALLENGE_TTL_MINS);
    TwoFactorRepo::upsert(&state.pool, input.user_id, &code, &input.method, expires_at).await?;

    if input.method == method::SMS {
        // SMS has no asynchronous callback, so no token is involved. Only a
        // provider rejection is the caller's fault; transport and parse
        // failures are retryable server errors.
        let body = format!("Your verification code is {code}. It expires in 10 minutes.");
        state
            .provider
            .send_sms(
                &input.phone_number,
                &state.config.telephony.from_number,
                &body,
            )
            .await
            .map_err(|e| match e {
                ProviderError::Rejected { .. } => {
                    AppError::BadRequest(format!("code delivery failed: {e}"))
                }
                other => AppError::InternalError(format!("code delivery failed: {other}")),
            })?;
    } else {
        dispatch_call(
            &state,
            &input.phone_number,
            CallVariant::SpeakCode { code },
            None,
        )
        .await?;
    }

    tracing::info!(user_id = input.user_id, method = %input.method, "2FA code sent");

    Ok(Json(SendCodeResponse {
        method: input.method,
        masked_destination: mask_destination(&input.phone_number),
    }))
}

/// POST /api/v1/2fa/verify
///
/// Check a submitted code against the user's outstanding challenge. A
/// successful verify consumes the challenge; a failed one burns an attempt,
/// and the challenge is invalidated outright after
/// [`MAX_VERIFY_ATTEMPTS`] failures.
pub async fn verify_code(
    State(state): State<AppState>,
    Json(input): Json<VerifyCodeRequest>,
) -> AppResult<Json<VerifyCodeResponse>> {
    let Some(challenge) = TwoFactorRepo::find(&state.pool, input.user_id).await? else {
        return Ok(Json(VerifyCodeResponse { verified: false }));
    };

    if challenge.is_expired(Utc::now()) {
        TwoFactorRepo::delete(&state.pool, input.user_id).await?;
        return Ok(Json(VerifyCodeResponse { verified: false }));
    }

    if challenge.code != input.code {
        // A missing row here means a concurrent verify already consumed or
        // invalidated the challenge; the attempt fails either way.
        if let Some(attempts) =
            TwoFactorRepo::increment_attempts(&state.pool, input.user_id).await?
        {
            if attempts >= MAX_VERIFY_ATTEMPTS {
                TwoFactorRepo::delete(&state.pool, input.user_id).await?;
                tracing::warn!(
                    user_id = input.user_id,
                    attempts,
                    "2FA challenge invalidated after repeated failures"
                );
            }
        }
        return Ok(Json(VerifyCodeResponse { verified: false }));
    }

    // Exact match inside the window: the delete is the single atomic
    // consume step. Of two concurrent verifies with the correct code, only
    // the one that removes the row succeeds.
    let verified = TwoFactorRepo::delete(&state.pool, input.user_id).await?;
    if verified {
        tracing::info!(user_id = input.user_id, "2FA verification succeeded");
    }
    Ok(Json(VerifyCodeResponse { verified }))
}
