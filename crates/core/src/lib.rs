//! Domain logic with no internal dependencies.
//!
//! Everything in this crate is pure (no I/O): token and code generation,
//! TwiML rendering, and the shared error/type aliases used by the db and
//! api crates.

pub mod error;
pub mod otp;
pub mod token;
pub mod twiml;
pub mod types;
