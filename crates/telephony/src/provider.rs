//! Voice provider trait and shared request/response/error types.

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Requests / responses
// ---------------------------------------------------------------------------

/// Parameters for placing one outbound call.
#[derive(Debug, Clone)]
pub struct PlaceCallRequest {
    /// Destination phone number in E.164 form.
    pub to: String,
    /// Caller phone number (configured sender).
    pub from: String,
    /// Public URL the provider fetches for call instructions.
    pub instruction_url: String,
    /// When set, the provider records the call and POSTs completion to this
    /// URL (call-to-record sessions only).
    pub recording_status_url: Option<String>,
}

/// A call accepted by the provider.
#[derive(Debug, Clone)]
pub struct PlacedCall {
    /// Provider-assigned call resource id.
    pub call_sid: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Stable user-facing categories for provider rejections.
///
/// Dispatch callers see one of these instead of raw provider error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCategory {
    InvalidNumber,
    UnverifiedSender,
    RecipientOptedOut,
    PermissionDenied,
    Unknown,
}

/// Errors from the voice provider layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout). These
    /// are retryable by the caller; this subsystem never retries itself.
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider rejected the operation with an error code.
    #[error("Provider rejected request (code {code}): {message}")]
    Rejected {
        /// Provider-specific numeric error code.
        code: i64,
        /// Provider error message, for logs only.
        message: String,
        /// User-facing category derived from `code`.
        category: RejectionCategory,
    },

    /// The provider response could not be parsed.
    #[error("Unexpected provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// The user-facing category for this error.
    pub fn category(&self) -> RejectionCategory {
        match self {
            ProviderError::Rejected { category, .. } => *category,
            _ => RejectionCategory::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Narrow interface over the telephony provider.
///
/// Injected into application state as a trait object so the dispatcher and
/// the recording ingestion pipeline are unit-testable without network access.
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Ask the provider to place an outbound call.
    async fn place_call(&self, request: &PlaceCallRequest) -> Result<PlacedCall, ProviderError>;

    /// Send an SMS. Returns the provider message id.
    async fn send_sms(&self, to: &str, from: &str, body: &str) -> Result<String, ProviderError>;

    /// Download the raw bytes of a finished recording.
    async fn fetch_recording(&self, recording_url: &str) -> Result<Vec<u8>, ProviderError>;
}
