//! Dialcast API server library.
//!
//! Exposes the building blocks (config, state, error handling, dispatch,
//! routes, background tasks) so integration tests and the binary entrypoint
//! can both access them.

pub mod background;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
