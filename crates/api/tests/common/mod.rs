#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use dialcast_api::config::{ServerConfig, TelephonyConfig};
use dialcast_api::routes;
use dialcast_api::state::AppState;
use dialcast_telephony::provider::{
    PlaceCallRequest, PlacedCall, ProviderError, RejectionCategory, VoiceProvider,
};
use dialcast_telephony::storage::{RecordingStorage, StorageError, StoredObject};
use dialcast_telephony::twilio::categorize_error_code;

/// Public base URL used by the test configuration; webhook signature tests
/// must reconstruct request URLs against this.
pub const TEST_BASE_URL: &str = "https://hooks.test";

/// Provider auth token used by the test configuration (also the webhook
/// signing secret).
pub const TEST_AUTH_TOKEN: &str = "test-auth-token";

/// Sender number used by the test configuration.
pub const TEST_FROM_NUMBER: &str = "+15550001111";

// ---------------------------------------------------------------------------
// Mock telephony provider
// ---------------------------------------------------------------------------

/// In-memory [`VoiceProvider`] that records every interaction.
#[derive(Default)]
pub struct MockVoiceProvider {
    /// Every accepted place-call request, in order.
    pub calls: Mutex<Vec<PlaceCallRequest>>,
    /// Every sent SMS as `(to, from, body)`.
    pub sms: Mutex<Vec<(String, String, String)>>,
    /// Destinations the provider rejects, with the error code to use.
    pub reject_numbers: Mutex<HashMap<String, i64>>,
    /// Bytes returned by `fetch_recording`; `None` makes the fetch fail.
    pub recording_bytes: Mutex<Option<Vec<u8>>>,
    /// When set, every SMS send fails with a non-rejection provider error.
    sms_delivery_broken: AtomicBool,
    sid_counter: AtomicU64,
}

impl MockVoiceProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            recording_bytes: Mutex::new(Some(b"fake-mp3-bytes".to_vec())),
            ..Self::default()
        })
    }

    /// Make the provider reject calls/SMS to `number` with `code`.
    pub fn reject_number(&self, number: &str, code: i64) {
        self.reject_numbers
            .lock()
            .unwrap()
            .insert(number.to_string(), code);
    }

    /// Make every `fetch_recording` call fail.
    pub fn fail_recording_fetch(&self) {
        *self.recording_bytes.lock().unwrap() = None;
    }

    /// Make every SMS send fail with a non-rejection error (the shape of a
    /// garbled or dropped provider response).
    pub fn break_sms_delivery(&self) {
        self.sms_delivery_broken.store(true, Ordering::SeqCst);
    }

    pub fn placed_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn check_rejection(&self, to: &str) -> Result<(), ProviderError> {
        if let Some(code) = self.reject_numbers.lock().unwrap().get(to) {
            return Err(ProviderError::Rejected {
                code: *code,
                message: format!("mock rejection for {to}"),
                category: categorize_error_code(*code),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VoiceProvider for MockVoiceProvider {
    async fn place_call(&self, request: &PlaceCallRequest) -> Result<PlacedCall, ProviderError> {
        self.check_rejection(&request.to)?;
        let n = self.sid_counter.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(request.clone());
        Ok(PlacedCall {
            call_sid: format!("CA-test-{n}"),
        })
    }

    async fn send_sms(&self, to: &str, from: &str, body: &str) -> Result<String, ProviderError> {
        self.check_rejection(to)?;
        if self.sms_delivery_broken.load(Ordering::SeqCst) {
            return Err(ProviderError::Malformed("mock delivery failure".into()));
        }
        let n = self.sid_counter.fetch_add(1, Ordering::SeqCst);
        self.sms
            .lock()
            .unwrap()
            .push((to.to_string(), from.to_string(), body.to_string()));
        Ok(format!("SM-test-{n}"))
    }

    async fn fetch_recording(&self, _recording_url: &str) -> Result<Vec<u8>, ProviderError> {
        match self.recording_bytes.lock().unwrap().clone() {
            Some(bytes) => Ok(bytes),
            None => Err(ProviderError::Rejected {
                code: 404,
                message: "mock recording fetch failure".into(),
                category: RejectionCategory::Unknown,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory recording storage
// ---------------------------------------------------------------------------

/// In-memory [`RecordingStorage`] with an upload counter.
#[derive(Default)]
pub struct MemoryStorage {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub upload_count: AtomicU64,
    fail_uploads: AtomicBool,
    /// Keys that have been uploaded, in order (duplicates included).
    pub upload_keys: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn uploads(&self) -> u64 {
        self.upload_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordingStorage for MemoryStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Upload("mock upload failure".into()));
        }
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        self.upload_keys.lock().unwrap().push(key.to_string());
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes);
        Ok(StoredObject {
            path: key.to_string(),
            url: Some(format!("mem://{key}")),
        })
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_base_url: TEST_BASE_URL.to_string(),
        request_timeout_secs: 30,
        recording_bucket: "test-bucket".to_string(),
        telephony: TelephonyConfig {
            account_sid: "ACtest".to_string(),
            auth_token: TEST_AUTH_TOKEN.to_string(),
            from_number: TEST_FROM_NUMBER.to_string(),
        },
    }
}

/// Build an [`AppState`] around the mock provider and in-memory storage.
pub fn build_test_state(
    pool: PgPool,
    provider: Arc<MockVoiceProvider>,
    storage: Arc<MemoryStorage>,
) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        provider,
        storage,
    }
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (request ID, timeout, tracing, panic
/// recovery, CORS) that production uses. Returns the mocks alongside the
/// router so tests can inspect provider and storage interactions.
pub fn build_test_app(pool: PgPool) -> (Router, Arc<MockVoiceProvider>, Arc<MemoryStorage>) {
    let provider = MockVoiceProvider::new();
    let storage = MemoryStorage::new();
    let app = build_app_with(build_test_state(
        pool,
        Arc::clone(&provider),
        Arc::clone(&storage),
    ));
    (app, provider, storage)
}

/// Build the router for a pre-assembled state.
pub fn build_app_with(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::hooks::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Perform a GET request against the app.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Perform a POST request with a JSON body.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Perform a POST request with a form-encoded body and optional provider
/// signature header.
pub async fn post_form(
    app: Router,
    path: &str,
    form: &[(&str, &str)],
    signature: Option<&str>,
) -> Response<Body> {
    let body: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish();

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(sig) = signature {
        builder = builder.header("x-twilio-signature", sig);
    }

    app.oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as a string.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign a webhook request the way the provider would: over the full public
/// URL (base + path and query) plus the sorted form parameters.
pub fn sign_webhook(path_and_query: &str, form: &[(&str, &str)]) -> String {
    let url = format!("{TEST_BASE_URL}{path_and_query}");
    let params: Vec<(String, String)> = form
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    dialcast_telephony::signature::compute_signature(TEST_AUTH_TOKEN, &url, &params)
}
