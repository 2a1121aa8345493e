//! Route definitions for the `/2fa` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::two_factor;
use crate::state::AppState;

/// Routes mounted under `/api/v1`.
///
/// ```text
/// POST /2fa/send    -> send_code
/// POST /2fa/verify  -> verify_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/2fa/send", post(two_factor::send_code))
        .route("/2fa/verify", post(two_factor::verify_code))
}
