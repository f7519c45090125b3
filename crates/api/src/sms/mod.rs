//! SMS notifier for order receipts.
//!
//! Wraps the Africa's Talking messaging API. The one rule of this module:
//! `send` never returns an error. Every failure mode - transport error,
//! rejected credentials, provider-side rejection, unparsable body - is
//! captured as an [`SmsOutcome`] with `status: failed` and a diagnostic
//! payload. Whether a text actually went out must never decide whether an
//! order exists.
//!
//! The notifier is built once at startup from [`SmsConfig`] and injected
//! through `AppState`; it is never re-initialized per call.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, warn};

use duka_core::{Phone, SmsStatus};

use crate::config::{SmsConfig, SmsMode};

/// Africa's Talking messaging endpoint (production).
const AT_API_URL: &str = "https://api.africastalking.com/version1/messaging";

/// Africa's Talking messaging endpoint (sandbox accounts).
const AT_SANDBOX_API_URL: &str = "https://api.sandbox.africastalking.com/version1/messaging";

/// Bound on how long a dispatch may hold up the request.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Structured outcome of one send attempt.
///
/// This is a value, not an error: the caller records it and moves on.
#[derive(Debug, Clone)]
pub struct SmsOutcome {
    /// Terminal delivery state.
    pub status: SmsStatus,
    /// Raw provider payload, or a diagnostic object on failure.
    pub response: Option<Value>,
}

impl SmsOutcome {
    fn failed(detail: Value) -> Self {
        Self {
            status: SmsStatus::Failed,
            response: Some(detail),
        }
    }
}

/// A call recorded by the mock notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSms {
    pub phone: String,
    pub message: String,
}

/// Process-wide SMS notifier, configured once at startup.
#[derive(Clone)]
pub enum SmsNotifier {
    /// Calls the Africa's Talking messaging API.
    Live(LiveNotifier),
    /// Records calls and reports `mocked` without sending anything.
    Mock(MockNotifier),
}

impl SmsNotifier {
    /// Build a notifier from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built. This runs once at startup;
    /// a client without the send timeout would void the dispatch bound, so
    /// construction fails loudly instead of degrading.
    #[must_use]
    pub fn from_config(config: &SmsConfig) -> Self {
        match config.mode {
            SmsMode::Live => Self::Live(LiveNotifier::new(
                config.username.clone(),
                config.api_key.clone(),
                config.sender_id.clone(),
                config.api_url.clone(),
            )),
            SmsMode::Mock => Self::Mock(MockNotifier::new()),
        }
    }

    /// Send a text message, returning the outcome.
    ///
    /// Infallible by contract: failures come back as
    /// `SmsStatus::Failed` outcomes, never as `Err`.
    pub async fn send(&self, phone: &Phone, message: &str) -> SmsOutcome {
        match self {
            Self::Live(live) => live.send(phone, message).await,
            Self::Mock(mock) => mock.send(phone, message),
        }
    }
}

impl std::fmt::Debug for SmsNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live(live) => f
                .debug_struct("SmsNotifier::Live")
                .field("username", &live.username)
                .field("api_key", &"[REDACTED]")
                .field("sender_id", &live.sender_id)
                .finish(),
            Self::Mock(_) => f.write_str("SmsNotifier::Mock"),
        }
    }
}

/// Live transport over reqwest.
#[derive(Clone)]
pub struct LiveNotifier {
    client: Client,
    username: String,
    api_key: SecretString,
    sender_id: Option<String>,
    api_url: String,
}

impl LiveNotifier {
    fn new(
        username: String,
        api_key: SecretString,
        sender_id: Option<String>,
        api_url: Option<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to build SMS HTTP client");

        let api_url = api_url.unwrap_or_else(|| default_api_url(&username).to_owned());

        Self {
            client,
            username,
            api_key,
            sender_id,
            api_url,
        }
    }

    async fn send(&self, phone: &Phone, message: &str) -> SmsOutcome {
        let mut form = vec![
            ("username", self.username.as_str()),
            ("to", phone.as_str()),
            ("message", message),
        ];
        if let Some(sender) = &self.sender_id {
            form.push(("from", sender.as_str()));
        }

        let response = self
            .client
            .post(&self.api_url)
            .header("apiKey", self.api_key.expose_secret())
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(phone = %phone, error = %e, "SMS transport error");
                return SmsOutcome::failed(json!({ "transport_error": e.to_string() }));
            }
        };

        let http_status = response.status().as_u16();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(phone = %phone, error = %e, "SMS response read error");
                return SmsOutcome::failed(json!({ "transport_error": e.to_string() }));
            }
        };

        let outcome = classify_response(http_status, &body);
        debug!(phone = %phone, status = %outcome.status, "SMS dispatch complete");
        outcome
    }
}

/// Resolve the messaging endpoint for an account.
///
/// Sandbox accounts hit the sandbox host; everything else hits production.
fn default_api_url(username: &str) -> &'static str {
    if username == "sandbox" {
        AT_SANDBOX_API_URL
    } else {
        AT_API_URL
    }
}

/// Classify a provider response into an outcome.
///
/// The provider reports per-recipient acceptance inside a 2xx body, so HTTP
/// status alone isn't enough: a recipient-level rejection (bad number,
/// insufficient balance) is a failure even on HTTP 201.
fn classify_response(http_status: u16, body: &str) -> SmsOutcome {
    let Ok(payload) = serde_json::from_str::<Value>(body) else {
        return SmsOutcome::failed(json!({
            "http_status": http_status,
            "unparsable_body": body,
        }));
    };

    if !(200..300).contains(&http_status) {
        return SmsOutcome::failed(json!({
            "http_status": http_status,
            "provider_response": payload,
        }));
    }

    let accepted = payload["SMSMessageData"]["Recipients"]
        .as_array()
        .is_some_and(|recipients| {
            !recipients.is_empty()
                && recipients
                    .iter()
                    .all(|r| r["status"].as_str() == Some("Success"))
        });

    if accepted {
        SmsOutcome {
            status: SmsStatus::Success,
            response: Some(payload),
        }
    } else {
        SmsOutcome::failed(json!({
            "http_status": http_status,
            "provider_response": payload,
        }))
    }
}

/// Mock transport: records every call and reports `mocked`.
#[derive(Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<RecordedSms>>>,
}

impl MockNotifier {
    /// Create an empty mock notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn send(&self, phone: &Phone, message: &str) -> SmsOutcome {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(RecordedSms {
                phone: phone.as_str().to_owned(),
                message: message.to_owned(),
            });
        }

        SmsOutcome {
            status: SmsStatus::Mocked,
            response: Some(json!({ "mocked": true })),
        }
    }

    /// Calls recorded so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<RecordedSms> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}
