pub mod calls;
pub mod health;
pub mod hooks;
pub mod two_factor;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree (application-triggered operations).
///
/// Route hierarchy:
///
/// ```text
/// /calls/tts                     text-to-speech robocall (POST)
/// /calls/audio                   audio-file robocall (POST)
/// /calls/record                  start call-to-record session (POST)
/// /recording-sessions/{id}       session status polling (GET)
///
/// /2fa/send                      deliver a one-time code (POST)
/// /2fa/verify                    check a submitted code (POST)
/// ```
///
/// The public provider hooks are mounted separately at the root (see
/// [`hooks::router`]); they carry their own token/signature guards instead
/// of the portal's session authentication.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(calls::router())
        .merge(two_factor::router())
}
