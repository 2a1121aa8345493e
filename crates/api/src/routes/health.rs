//! Route definition for the health check endpoint.

use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// `GET /health`, mounted at the server root.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health::health))
}
