//! Handlers for application-triggered outbound calls.

use axum::extract::{Path, State};
use axum::Json;
use dialcast_core::error::CoreError;
use dialcast_core::types::DbId;
use dialcast_db::models::recording_session::RecordingSession;
use dialcast_db::repositories::RecordingSessionRepo;
use dialcast_telephony::provider::ProviderError;
use serde::{Deserialize, Serialize};

use crate::dispatch::{dispatch_call, dispatch_many, CallVariant, DispatchError, RecipientOutcome};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::EmptyDestination => {
                AppError::Core(CoreError::Validation(e.to_string()))
            }
            DispatchError::Storage(err) => AppError::Database(err),
            DispatchError::Provider(ProviderError::Rejected { .. }) => {
                AppError::BadRequest(e.to_string())
            }
            // Transport and parse failures are retryable by the caller.
            other => AppError::InternalError(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /calls/tts`.
#[derive(Debug, Deserialize)]
pub struct TtsCallRequest {
    pub to: Vec<String>,
    pub message: String,
    pub from_name: String,
}

/// Request body for `POST /calls/audio`.
#[derive(Debug, Deserialize)]
pub struct AudioCallRequest {
    pub to: Vec<String>,
    pub audio_url: String,
    pub from_name: String,
}

/// Per-recipient results of a bulk dispatch.
#[derive(Debug, Serialize)]
pub struct BulkDispatchResponse {
    pub results: Vec<RecipientOutcome>,
}

/// Request body for `POST /calls/record`.
#[derive(Debug, Deserialize)]
pub struct RecordCallRequest {
    pub to: String,
    pub user_id: Option<DbId>,
}

/// Response for `POST /calls/record`.
#[derive(Debug, Serialize)]
pub struct RecordCallResponse {
    pub session_id: DbId,
    pub call_sid: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/calls/tts
///
/// Text-to-speech robocall to one or more recipients. Recipients are
/// processed independently; the response carries a per-recipient result.
pub async fn robocall_tts(
    State(state): State<AppState>,
    Json(input): Json<TtsCallRequest>,
) -> AppResult<Json<BulkDispatchResponse>> {
    if input.to.is_empty() {
        return Err(CoreError::Validation("no recipients given".into()).into());
    }
    let variant = CallVariant::SpeakMessage {
        message: input.message,
        from_name: input.from_name,
    };
    let results = dispatch_many(&state, &input.to, &variant).await;
    Ok(Json(BulkDispatchResponse { results }))
}

/// POST /api/v1/calls/audio
///
/// Audio-file robocall to one or more recipients.
pub async fn robocall_audio(
    State(state): State<AppState>,
    Json(input): Json<AudioCallRequest>,
) -> AppResult<Json<BulkDispatchResponse>> {
    if input.to.is_empty() {
        return Err(CoreError::Validation("no recipients given".into()).into());
    }
    let variant = CallVariant::PlayAudio {
        audio_url: input.audio_url,
        from_name: input.from_name,
    };
    let results = dispatch_many(&state, &input.to, &variant).await;
    Ok(Json(BulkDispatchResponse { results }))
}

/// POST /api/v1/calls/record
///
/// Start a "call me and record a message" session: creates the session row,
/// then dispatches the prompt-and-record call bound to it. A dispatch
/// failure settles the session as failed immediately.
pub async fn record_call(
    State(state): State<AppState>,
    Json(input): Json<RecordCallRequest>,
) -> AppResult<Json<RecordCallResponse>> {
    if input.to.trim().is_empty() {
        return Err(CoreError::Validation("destination number must not be empty".into()).into());
    }

    let session = RecordingSessionRepo::create(&state.pool, input.user_id, &input.to).await?;

    match dispatch_call(&state, &input.to, CallVariant::PromptAndRecord, Some(session.id)).await {
        Ok(call_sid) => {
            RecordingSessionRepo::set_call_sid(&state.pool, session.id, &call_sid).await?;
            Ok(Json(RecordCallResponse {
                session_id: session.id,
                call_sid,
            }))
        }
        Err(e) => {
            let reason = e.to_string();
            if let Err(db_err) =
                RecordingSessionRepo::fail_if_pending(&state.pool, session.id, &reason).await
            {
                tracing::error!(session_id = session.id, error = %db_err, "Failed to settle session after dispatch failure");
            }
            Err(e.into())
        }
    }
}

/// GET /api/v1/recording-sessions/{id}
///
/// Session status polling: how the initiating user observes ingestion
/// failures, which are never surfaced through the webhook response.
pub async fn get_recording_session(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<RecordingSession>> {
    let session = RecordingSessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "recording_session",
            id,
        })?;
    Ok(Json(session))
}
