/// Telephony provider configuration.
///
/// All three fields are required: dispatch cannot function without account
/// credentials and a verified sender number, so a missing value is a fatal
/// configuration error at startup.
#[derive(Debug, Clone)]
pub struct TelephonyConfig {
    /// Provider account identifier.
    pub account_sid: String,
    /// Provider auth token; also the webhook signature signing secret.
    pub auth_token: String,
    /// Sender phone number in E.164 form.
    pub from_number: String,
}

impl TelephonyConfig {
    /// Load telephony configuration from environment variables.
    ///
    /// | Env Var              | Required |
    /// |----------------------|----------|
    /// | `TWILIO_ACCOUNT_SID` | **yes**  |
    /// | `TWILIO_AUTH_TOKEN`  | **yes**  |
    /// | `TWILIO_FROM_NUMBER` | **yes**  |
    ///
    /// # Panics
    ///
    /// Panics if any variable is unset or empty.
    pub fn from_env() -> Self {
        let account_sid = required_env("TWILIO_ACCOUNT_SID");
        let auth_token = required_env("TWILIO_AUTH_TOKEN");
        let from_number = required_env("TWILIO_FROM_NUMBER");

        Self {
            account_sid,
            auth_token,
            from_number,
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Publicly reachable base URL for provider callbacks, e.g.
    /// `https://portal.example.com`. Required: the provider must be able to
    /// fetch instructions and post recording status over the internet.
    pub public_base_url: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// S3 bucket for persisted recordings.
    pub recording_bucket: String,
    /// Telephony provider credentials and sender number.
    pub telephony: TelephonyConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Required | Default   |
    /// |------------------------|----------|-----------|
    /// | `HOST`                 | no       | `0.0.0.0` |
    /// | `PORT`                 | no       | `3000`    |
    /// | `PUBLIC_BASE_URL`      | **yes**  | --        |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`      |
    /// | `RECORDING_BUCKET`     | **yes**  | --        |
    ///
    /// Plus the `TWILIO_*` variables documented on
    /// [`TelephonyConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics if a required variable is unset or a numeric one fails to
    /// parse. Configuration errors are fatal at startup, never retried.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let public_base_url = required_env("PUBLIC_BASE_URL")
            .trim_end_matches('/')
            .to_string();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let recording_bucket = required_env("RECORDING_BUCKET");

        Self {
            host,
            port,
            public_base_url,
            request_timeout_secs,
            recording_bucket,
            telephony: TelephonyConfig::from_env(),
        }
    }
}

/// Read a required, non-empty environment variable or panic.
fn required_env(name: &str) -> String {
    let value =
        std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"));
    assert!(!value.is_empty(), "{name} must not be empty");
    value
}
