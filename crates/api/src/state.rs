use std::sync::Arc;

use dialcast_telephony::provider::VoiceProvider;
use dialcast_telephony::storage::RecordingStorage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). The provider and
/// storage are trait objects so tests can substitute in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: dialcast_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Telephony provider (place calls, send SMS, fetch recordings).
    pub provider: Arc<dyn VoiceProvider>,
    /// Durable object storage for recordings.
    pub storage: Arc<dyn RecordingStorage>,
}
