//! Telephony provider integration.
//!
//! The api crate talks to the outside world only through the narrow traits
//! defined here: [`provider::VoiceProvider`] for placing calls, sending SMS
//! and fetching recordings, and [`storage::RecordingStorage`] for durable
//! object storage. The Twilio REST and S3 implementations live alongside the
//! traits; tests substitute in-memory fakes.

pub mod provider;
pub mod signature;
pub mod storage;
pub mod twilio;
