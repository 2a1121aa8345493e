//! Outbound call dispatch.
//!
//! Dispatching a call mints a webhook token, builds the instruction-fetch
//! callback URL with the token embedded as a query credential, and asks the
//! provider to place the call. A call-to-record dispatch additionally mints
//! a second, independent token for the recording-status callback. On
//! provider rejection every token minted for the attempt is deleted, so a
//! failed dispatch leaves no live credentials behind.

use chrono::Utc;
use dialcast_core::token::{generate_token, token_expiry};
use dialcast_core::types::DbId;
use dialcast_db::repositories::WebhookTokenRepo;
use dialcast_telephony::provider::{PlaceCallRequest, ProviderError, RejectionCategory};
use serde::Serialize;
use url::Url;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// What the dispatched call should do when it connects.
#[derive(Debug, Clone)]
pub enum CallVariant {
    /// Speak a two-factor verification code.
    SpeakCode { code: String },
    /// Speak an arbitrary message on behalf of a named sender.
    SpeakMessage { message: String, from_name: String },
    /// Play an audio URL on behalf of a named sender.
    PlayAudio { audio_url: String, from_name: String },
    /// Prompt the callee to record a message (call-to-record sessions).
    PromptAndRecord,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Errors from a single dispatch attempt.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("destination number must not be empty")]
    EmptyDestination,

    #[error("invalid callback base URL: {0}")]
    CallbackUrl(#[from] url::ParseError),

    #[error("call-to-record dispatch requires a session id")]
    MissingSession,

    #[error(transparent)]
    Storage(#[from] sqlx::Error),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl DispatchError {
    /// The user-facing rejection category, where one applies.
    pub fn category(&self) -> RejectionCategory {
        match self {
            DispatchError::EmptyDestination => RejectionCategory::InvalidNumber,
            DispatchError::Provider(e) => e.category(),
            _ => RejectionCategory::Unknown,
        }
    }
}

/// Per-recipient result of a bulk dispatch.
#[derive(Debug, Serialize)]
pub struct RecipientOutcome {
    pub to: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<RejectionCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Place one outbound call.
///
/// `session_id` must be set for [`CallVariant::PromptAndRecord`] and binds
/// the minted tokens to the call-to-record session. Returns the provider
/// call sid on acceptance.
pub async fn dispatch_call(
    state: &AppState,
    to: &str,
    variant: CallVariant,
    session_id: Option<DbId>,
) -> Result<String, DispatchError> {
    if to.trim().is_empty() {
        return Err(DispatchError::EmptyDestination);
    }

    let base = &state.config.public_base_url;
    let expires_at = token_expiry(Utc::now());

    // Mint the instruction-fetch token.
    let instruction_token = generate_token();
    WebhookTokenRepo::create(&state.pool, &instruction_token, session_id, expires_at).await?;

    let instruction_url = instruction_callback_url(base, &variant, &instruction_token, session_id)?;

    // Call-to-record gets a second, independent credential for the
    // recording-status callback.
    let status_token = match &variant {
        CallVariant::PromptAndRecord => {
            let token = generate_token();
            WebhookTokenRepo::create(&state.pool, &token, session_id, expires_at).await?;
            Some(token)
        }
        _ => None,
    };

    let recording_status_url = match (&status_token, session_id) {
        (Some(token), Some(sid)) => Some(build_callback_url(
            base,
            "recording-status",
            &[("sessionId", &sid.to_string()), ("token", token)],
        )?),
        _ => None,
    };

    let request = PlaceCallRequest {
        to: to.to_string(),
        from: state.config.telephony.from_number.clone(),
        instruction_url,
        recording_status_url,
    };

    match state.provider.place_call(&request).await {
        Ok(placed) => {
            // Best-effort: a failed attach never invalidates the token.
            attach_sid(state, &instruction_token, &placed.call_sid).await;
            if let Some(token) = &status_token {
                attach_sid(state, token, &placed.call_sid).await;
            }
            tracing::info!(to, call_sid = %placed.call_sid, "Outbound call placed");
            Ok(placed.call_sid)
        }
        Err(e) => {
            // Rollback: the attempt must leave no surviving tokens.
            let _ = WebhookTokenRepo::delete(&state.pool, &instruction_token).await;
            if let Some(token) = &status_token {
                let _ = WebhookTokenRepo::delete(&state.pool, token).await;
            }
            tracing::warn!(to, error = %e, "Outbound call rejected, tokens rolled back");
            Err(DispatchError::Provider(e))
        }
    }
}

/// Dispatch the same call variant to multiple recipients.
///
/// Recipients are processed sequentially to respect provider rate limits;
/// one recipient's failure never aborts the others.
pub async fn dispatch_many(
    state: &AppState,
    recipients: &[String],
    variant: &CallVariant,
) -> Vec<RecipientOutcome> {
    let mut outcomes = Vec::with_capacity(recipients.len());
    for to in recipients {
        let outcome = match dispatch_call(state, to, variant.clone(), None).await {
            Ok(call_sid) => RecipientOutcome {
                to: to.clone(),
                success: true,
                call_sid: Some(call_sid),
                error_category: None,
                error: None,
            },
            Err(e) => RecipientOutcome {
                to: to.clone(),
                success: false,
                call_sid: None,
                error_category: Some(e.category()),
                error: Some(e.to_string()),
            },
        };
        outcomes.push(outcome);
    }
    outcomes
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn attach_sid(state: &AppState, token: &str, call_sid: &str) {
    if let Err(e) = WebhookTokenRepo::attach_call_sid(&state.pool, token, call_sid).await {
        tracing::warn!(error = %e, "Failed to attach call sid to token");
    }
}

/// Build the instruction-fetch URL for a variant.
fn instruction_callback_url(
    base: &str,
    variant: &CallVariant,
    token: &str,
    session_id: Option<DbId>,
) -> Result<String, DispatchError> {
    let url = match variant {
        CallVariant::SpeakCode { code } => {
            build_callback_url(base, "voice-2fa", &[("code", code), ("token", token)])?
        }
        CallVariant::SpeakMessage { message, from_name } => build_callback_url(
            base,
            "robocall-tts",
            &[
                ("message", message),
                ("fromName", from_name),
                ("token", token),
            ],
        )?,
        CallVariant::PlayAudio {
            audio_url,
            from_name,
        } => build_callback_url(
            base,
            "robocall-audio",
            &[
                ("audioUrl", audio_url),
                ("fromName", from_name),
                ("token", token),
            ],
        )?,
        CallVariant::PromptAndRecord => {
            // A record prompt is meaningless without the session its
            // recording-status callback settles.
            let session = session_id.ok_or(DispatchError::MissingSession)?;
            build_callback_url(
                base,
                "call-to-record",
                &[("sessionId", &session.to_string()), ("token", token)],
            )?
        }
    };
    Ok(url)
}

/// Join `path` onto the public base URL with percent-encoded query pairs.
fn build_callback_url(
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<String, url::ParseError> {
    let mut url = Url::parse(&format!("{}/{path}", base.trim_end_matches('/')))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in params {
            pairs.append_pair(name, value);
        }
    }
    Ok(url.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn relative_base_url_is_a_callback_error() {
        let err = build_callback_url("not a base url", "voice-2fa", &[]).unwrap_err();
        assert_matches!(err, url::ParseError::RelativeUrlWithoutBase);
    }

    #[test]
    fn callback_url_encodes_query_values() {
        let url = build_callback_url(
            "https://portal.example.com",
            "robocall-tts",
            &[("message", "snow day & early close"), ("token", "abc123")],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://portal.example.com/robocall-tts?message=snow+day+%26+early+close&token=abc123"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_tolerated() {
        let url = build_callback_url("https://portal.example.com/", "voice-2fa", &[]).unwrap();
        assert_eq!(url, "https://portal.example.com/voice-2fa");
    }

    #[test]
    fn speak_code_url_carries_code_and_token() {
        let variant = CallVariant::SpeakCode {
            code: "482913".into(),
        };
        let url =
            instruction_callback_url("https://portal.example.com", &variant, "tok", None).unwrap();
        assert_eq!(
            url,
            "https://portal.example.com/voice-2fa?code=482913&token=tok"
        );
    }

    #[test]
    fn record_variant_without_session_is_rejected() {
        let err = instruction_callback_url(
            "https://p.example.com",
            &CallVariant::PromptAndRecord,
            "t1",
            None,
        )
        .unwrap_err();
        assert_matches!(err, DispatchError::MissingSession);
    }

    #[test]
    fn record_url_carries_session_and_token() {
        let url =
            instruction_callback_url("https://p.example.com", &CallVariant::PromptAndRecord, "t1", Some(42))
                .unwrap();
        assert_eq!(url, "https://p.example.com/call-to-record?sessionId=42&token=t1");
    }
}
