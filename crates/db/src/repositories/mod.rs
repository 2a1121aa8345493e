//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod recording_session_repo;
pub mod saved_recording_repo;
pub mod two_factor_repo;
pub mod webhook_token_repo;

pub use recording_session_repo::RecordingSessionRepo;
pub use saved_recording_repo::SavedRecordingRepo;
pub use two_factor_repo::TwoFactorRepo;
pub use webhook_token_repo::WebhookTokenRepo;
