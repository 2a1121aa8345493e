//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus any create DTOs for inserts.

pub mod recording_session;
pub mod saved_recording;
pub mod two_factor;
pub mod webhook_token;
