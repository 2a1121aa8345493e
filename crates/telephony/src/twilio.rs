//! Twilio REST API client.
//!
//! Implements [`VoiceProvider`] against the Twilio 2010-04-01 API using
//! basic-auth form POSTs. Only the three primitives the subsystem needs are
//! wrapped: call creation, message creation, and recording download.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::provider::{
    PlaceCallRequest, PlacedCall, ProviderError, RejectionCategory, VoiceProvider,
};

/// Twilio API base URL. Overridable for tests.
const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// HTTP timeout for a single provider request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Twilio account credentials.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Successful call/message creation response (fields we use).
#[derive(Debug, Deserialize)]
struct ResourceResponse {
    sid: String,
}

/// Twilio error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

/// Map a Twilio error code to a stable user-facing category.
///
/// Codes: 21211/21214/21217 malformed or unreachable destination, 21210 and
/// 21606 unverified or incapable sender number, 21610 recipient replied
/// STOP, 20003/21408 authentication or geo-permission failures.
pub fn categorize_error_code(code: i64) -> RejectionCategory {
    match code {
        21211 | 21214 | 21217 => RejectionCategory::InvalidNumber,
        21210 | 21606 => RejectionCategory::UnverifiedSender,
        21610 => RejectionCategory::RecipientOptedOut,
        20003 | 21408 => RejectionCategory::PermissionDenied,
        _ => RejectionCategory::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the Twilio REST API.
pub struct TwilioClient {
    client: reqwest::Client,
    api_base: String,
    credentials: TwilioCredentials,
}

impl TwilioClient {
    /// Create a new client with the default API base URL.
    pub fn new(credentials: TwilioCredentials) -> Self {
        Self::with_api_base(credentials, DEFAULT_API_BASE.to_string())
    }

    /// Create a client pointed at a custom API base (tests, mock servers).
    pub fn with_api_base(credentials: TwilioCredentials, api_base: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            api_base,
            credentials,
        }
    }

    /// POST a form to an account-scoped resource and parse the created sid.
    async fn create_resource(
        &self,
        resource: &str,
        form: &[(&str, &str)],
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/{resource}.json",
            self.api_base, self.credentials.account_sid
        );

        let response = self
            .client
            .post(url)
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed: TwilioErrorBody =
                serde_json::from_str(&body).unwrap_or(TwilioErrorBody {
                    code: None,
                    message: None,
                });
            let code = parsed.code.unwrap_or(status.as_u16() as i64);
            let message = parsed
                .message
                .unwrap_or_else(|| format!("HTTP {status}: {body}"));
            tracing::warn!(code, %message, "Twilio rejected {resource} creation");
            return Err(ProviderError::Rejected {
                code,
                message,
                category: categorize_error_code(code),
            });
        }

        let parsed: ResourceResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(parsed.sid)
    }
}

#[async_trait]
impl VoiceProvider for TwilioClient {
    async fn place_call(&self, request: &PlaceCallRequest) -> Result<PlacedCall, ProviderError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("To", &request.to),
            ("From", &request.from),
            ("Url", &request.instruction_url),
            ("Method", "GET"),
        ];
        if let Some(status_url) = &request.recording_status_url {
            form.push(("Record", "true"));
            form.push(("RecordingStatusCallback", status_url));
            form.push(("RecordingStatusCallbackMethod", "POST"));
        }

        let call_sid = self.create_resource("Calls", &form).await?;
        Ok(PlacedCall { call_sid })
    }

    async fn send_sms(&self, to: &str, from: &str, body: &str) -> Result<String, ProviderError> {
        let form = [("To", to), ("From", from), ("Body", body)];
        self.create_resource("Messages", &form).await
    }

    async fn fetch_recording(&self, recording_url: &str) -> Result<Vec<u8>, ProviderError> {
        // Recording media requires account credentials; the `.mp3` suffix
        // selects the compressed rendition.
        let url = format!("{recording_url}.mp3");
        let response = self
            .client
            .get(url)
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                code: status.as_u16() as i64,
                message: format!("recording fetch returned HTTP {status}"),
                category: RejectionCategory::Unknown,
            });
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
