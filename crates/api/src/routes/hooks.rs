//! Route definitions for the public provider webhook endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::hooks;
use crate::state::AppState;

/// Routes mounted at the server root (the provider is given absolute URLs
/// built from `PUBLIC_BASE_URL`).
///
/// ```text
/// GET  /voice-2fa         -> code-speaking control document
/// GET  /robocall-tts      -> message-speaking control document
/// GET  /robocall-audio    -> audio-playing control document
/// GET  /call-to-record    -> record-prompt control document
/// POST /recording-status  -> recording ingestion (token + signature)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/voice-2fa", get(hooks::voice_2fa))
        .route("/robocall-tts", get(hooks::robocall_tts))
        .route("/robocall-audio", get(hooks::robocall_audio))
        .route("/call-to-record", get(hooks::call_to_record))
        .route("/recording-status", post(hooks::recording_status))
}
