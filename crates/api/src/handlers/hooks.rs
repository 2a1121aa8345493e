//! Handlers for the public provider webhook endpoints.
//!
//! These endpoints are reachable by anyone who guesses a URL, so every one
//! of them is guarded by a webhook token, and the recording-status POST is
//! additionally guarded by the provider's request signature. Authorization
//! failures are rejected 403 with no body detail; the reason is only logged
//! for audit. Once a recording-status request is authorized, all ingestion
//! errors are absorbed into session state and the provider always sees 200
//! with an empty control document, so application bugs cannot trigger
//! provider-side retry storms.

use axum::extract::{OriginalUri, Query, RawForm, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use dialcast_core::twiml;
use dialcast_core::types::DbId;
use dialcast_db::models::recording_session::RecordingSession;
use dialcast_db::models::saved_recording::CreateSavedRecording;
use dialcast_db::repositories::{RecordingSessionRepo, SavedRecordingRepo, WebhookTokenRepo};
use dialcast_telephony::signature::{validate_signature, SIGNATURE_HEADER};
use serde::Deserialize;

use crate::state::AppState;

/// Storage content type for provider recordings.
const RECORDING_CONTENT_TYPE: &str = "audio/mpeg";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A TwiML control document response (`text/xml`).
pub struct TwiML(pub String);

impl IntoResponse for TwiML {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "text/xml")], self.0).into_response()
    }
}

/// Rejection of an unauthorized webhook request: 403 with an empty body, so
/// nothing about the failure reason is disclosed.
pub struct HookReject;

impl IntoResponse for HookReject {
    fn into_response(self) -> Response {
        StatusCode::FORBIDDEN.into_response()
    }
}

// ---------------------------------------------------------------------------
// Token guard
// ---------------------------------------------------------------------------

/// Reject unless `token` is present and currently valid.
///
/// Validation is read-only; the provider may retry a callback with the same
/// credential. A storage error also rejects: a request that cannot be
/// authorized is treated as unauthorized.
async fn require_valid_token(state: &AppState, token: Option<&str>) -> Result<(), HookReject> {
    let Some(token) = token else {
        tracing::warn!("Webhook rejected: missing token");
        return Err(HookReject);
    };
    match WebhookTokenRepo::is_valid(&state.pool, token).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            tracing::warn!("Webhook rejected: unknown or expired token");
            Err(HookReject)
        }
        Err(e) => {
            tracing::error!(error = %e, "Webhook rejected: token validation failed");
            Err(HookReject)
        }
    }
}

// ---------------------------------------------------------------------------
// Instruction-fetch handlers (GET)
// ---------------------------------------------------------------------------

/// Query parameters for `GET /voice-2fa`.
#[derive(Debug, Deserialize)]
pub struct Voice2faQuery {
    pub code: Option<String>,
    pub token: Option<String>,
}

/// GET /voice-2fa
///
/// Returns the code-speaking control document. Token-guarded like every
/// other hook endpoint.
pub async fn voice_2fa(
    State(state): State<AppState>,
    Query(query): Query<Voice2faQuery>,
) -> Result<TwiML, HookReject> {
    require_valid_token(&state, query.token.as_deref()).await?;
    let code = query.code.unwrap_or_default();
    Ok(TwiML(twiml::speak_code(&code)))
}

/// Query parameters for `GET /robocall-tts`.
#[derive(Debug, Deserialize)]
pub struct RobocallTtsQuery {
    pub message: Option<String>,
    #[serde(rename = "fromName")]
    pub from_name: Option<String>,
    pub token: Option<String>,
}

/// GET /robocall-tts
///
/// Returns the message-speaking control document.
pub async fn robocall_tts(
    State(state): State<AppState>,
    Query(query): Query<RobocallTtsQuery>,
) -> Result<TwiML, HookReject> {
    require_valid_token(&state, query.token.as_deref()).await?;
    let message = query.message.unwrap_or_default();
    let from_name = query.from_name.unwrap_or_default();
    Ok(TwiML(twiml::speak_message(&message, &from_name)))
}

/// Query parameters for `GET /robocall-audio`.
#[derive(Debug, Deserialize)]
pub struct RobocallAudioQuery {
    #[serde(rename = "audioUrl")]
    pub audio_url: Option<String>,
    #[serde(rename = "fromName")]
    pub from_name: Option<String>,
    pub token: Option<String>,
}

/// GET /robocall-audio
///
/// Returns the audio-playing control document.
pub async fn robocall_audio(
    State(state): State<AppState>,
    Query(query): Query<RobocallAudioQuery>,
) -> Result<TwiML, HookReject> {
    require_valid_token(&state, query.token.as_deref()).await?;
    let audio_url = query.audio_url.unwrap_or_default();
    let from_name = query.from_name.unwrap_or_default();
    Ok(TwiML(twiml::play_audio(&audio_url, &from_name)))
}

/// Query parameters for `GET /call-to-record`.
#[derive(Debug, Deserialize)]
pub struct CallToRecordQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<DbId>,
    pub token: Option<String>,
}

/// GET /call-to-record
///
/// Returns the record-prompt control document.
pub async fn call_to_record(
    State(state): State<AppState>,
    Query(query): Query<CallToRecordQuery>,
) -> Result<TwiML, HookReject> {
    require_valid_token(&state, query.token.as_deref()).await?;
    Ok(TwiML(twiml::prompt_and_record(
        twiml::DEFAULT_MAX_RECORDING_SECS,
        twiml::DEFAULT_FINISH_KEY,
    )))
}

// ---------------------------------------------------------------------------
// Recording-status handler (POST)
// ---------------------------------------------------------------------------

/// Query parameters for `POST /recording-status`.
#[derive(Debug, Deserialize)]
pub struct RecordingStatusQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<DbId>,
    pub token: Option<String>,
}

/// POST /recording-status
///
/// The provider's asynchronous "recording finished" callback. Requires a
/// valid token AND a valid provider request signature; an authorized
/// request is always acknowledged 200 with an empty control document, no
/// matter what happens during ingestion.
pub async fn recording_status(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<RecordingStatusQuery>,
    headers: HeaderMap,
    RawForm(body): RawForm,
) -> Result<TwiML, HookReject> {
    require_valid_token(&state, query.token.as_deref()).await?;

    // The signature covers the exact URL the provider was given plus every
    // POST parameter, proving provider origin even if a token leaks.
    let form: Vec<(String, String)> = url::form_urlencoded::parse(&body)
        .into_owned()
        .collect();

    let request_url = format!(
        "{}{}",
        state.config.public_base_url,
        uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("")
    );

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !validate_signature(
        &state.config.telephony.auth_token,
        &request_url,
        &form,
        signature,
    ) {
        tracing::warn!("Recording-status rejected: invalid provider signature");
        return Err(HookReject);
    }

    process_recording_status(&state, query.session_id, &form).await;

    // Always 200 with an empty document so the provider does not retry.
    Ok(TwiML(twiml::empty()))
}

/// Run the ingestion pipeline, absorbing every failure into session state.
async fn process_recording_status(
    state: &AppState,
    session_id: Option<DbId>,
    form: &[(String, String)],
) {
    let field = |name: &str| -> Option<&str> {
        form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    };

    // Partial or failed provider recordings are acknowledged without acting;
    // this component does not retry them.
    let status = field("RecordingStatus").unwrap_or_default();
    if status != "completed" {
        tracing::debug!(status, "Ignoring non-completed recording status");
        return;
    }

    let (Some(recording_sid), Some(recording_url)) =
        (field("RecordingSid"), field("RecordingUrl"))
    else {
        tracing::warn!("Recording-status completed but missing recording fields");
        return;
    };

    let Some(session_id) = session_id else {
        tracing::warn!("Recording-status carried no session id");
        return;
    };

    let session = match RecordingSessionRepo::find_by_id(&state.pool, session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            tracing::warn!(session_id, "Recording-status for unknown session");
            return;
        }
        Err(e) => {
            tracing::error!(session_id, error = %e, "Failed to load recording session");
            return;
        }
    };

    // Duplicate delivery: the session already settled; do not re-fetch or
    // re-upload.
    if session.is_terminal() {
        tracing::info!(session_id, status = %session.status, "Recording-status redelivered, short-circuiting");
        return;
    }

    let duration_secs: Option<i32> = field("RecordingDuration").and_then(|d| d.parse().ok());

    ingest_recording(state, &session, recording_sid, recording_url, duration_secs).await;
}

/// Fetch the recording from the provider, persist it, and settle the
/// session. Fetch and storage failures are terminal for the session.
async fn ingest_recording(
    state: &AppState,
    session: &RecordingSession,
    recording_sid: &str,
    recording_url: &str,
    duration_secs: Option<i32>,
) {
    let bytes = match state.provider.fetch_recording(recording_url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(session_id = session.id, error = %e, "Recording fetch failed");
            fail_session(state, session.id, &format!("recording fetch failed: {e}")).await;
            return;
        }
    };

    let key = format!("recordings/{recording_sid}.mp3");
    let stored = match state
        .storage
        .upload(&key, bytes, RECORDING_CONTENT_TYPE)
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            tracing::error!(session_id = session.id, error = %e, "Recording upload failed");
            fail_session(state, session.id, &format!("recording upload failed: {e}")).await;
            return;
        }
    };

    let won = match RecordingSessionRepo::complete_if_pending(
        &state.pool,
        session.id,
        recording_sid,
        recording_url,
        &stored.path,
    )
    .await
    {
        Ok(won) => won,
        Err(e) => {
            tracing::error!(session_id = session.id, error = %e, "Failed to complete session");
            return;
        }
    };

    if !won {
        // A concurrent delivery settled the session first.
        tracing::info!(session_id = session.id, "Session already terminal, skipping library entry");
        return;
    }

    tracing::info!(session_id = session.id, recording_sid, "Recording session completed");

    // Best-effort library entry: failure here is logged but never flips the
    // session status or the webhook response.
    if let Some(user_id) = session.user_id {
        let input = CreateSavedRecording {
            user_id,
            title: format!("Recorded message {}", Utc::now().format("%Y-%m-%d")),
            storage_path: stored.path.clone(),
            duration_secs,
            source_session_id: Some(session.id),
        };
        if let Err(e) = SavedRecordingRepo::create(&state.pool, &input).await {
            tracing::warn!(session_id = session.id, error = %e, "Failed to save recording to library");
        }
    }
}

async fn fail_session(state: &AppState, session_id: DbId, error: &str) {
    if let Err(e) = RecordingSessionRepo::fail_if_pending(&state.pool, session_id, error).await {
        tracing::error!(session_id, error = %e, "Failed to mark session failed");
    }
}
