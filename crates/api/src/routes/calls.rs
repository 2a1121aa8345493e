//! Route definitions for the `/calls` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::calls;
use crate::state::AppState;

/// Routes mounted under `/api/v1`.
///
/// ```text
/// POST /calls/tts                  -> robocall_tts
/// POST /calls/audio                -> robocall_audio
/// POST /calls/record               -> record_call
/// GET  /recording-sessions/{id}    -> get_recording_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calls/tts", post(calls::robocall_tts))
        .route("/calls/audio", post(calls::robocall_audio))
        .route("/calls/record", post(calls::record_call))
        .route("/recording-sessions/{id}", get(calls::get_recording_session))
}
