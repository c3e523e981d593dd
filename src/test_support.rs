//! Test doubles: in-memory settings and a loopback mock webhook

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;

use crate::settings::{SettingsError, SettingsRepository, UserSettings};

/// Settings storage that lives as long as the test
#[derive(Debug, Default)]
pub struct MemorySettings {
    raw: Mutex<Option<String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with arbitrary stored text
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    /// The stored text, exactly as written
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettingsRepository for MemorySettings {
    async fn save(&self, settings: &UserSettings) -> Result<(), SettingsError> {
        let raw = serde_json::to_string(settings)?;
        *self.raw.lock().unwrap() = Some(raw);
        Ok(())
    }

    async fn load(&self) -> Option<UserSettings> {
        self.raw().as_deref().and_then(UserSettings::parse)
    }
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Vec<(StatusCode, String)>>,
    served: Arc<AtomicUsize>,
    delay: Duration,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// A webhook endpoint bound to a random loopback port
pub struct MockWebhook {
    pub url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockWebhook {
    /// Answer every request with the same status and body
    pub async fn start(status: u16, body: &str) -> Self {
        Self::start_with(vec![(status, body)]).await
    }

    /// Answer requests with the given responses in order; the last repeats
    pub async fn start_with(responses: Vec<(u16, &str)>) -> Self {
        Self::serve(responses, Duration::ZERO).await
    }

    /// Answer every request only after `delay` has passed
    pub async fn start_delayed(delay: Duration, status: u16, body: &str) -> Self {
        Self::serve(vec![(status, body)], delay).await
    }

    async fn serve(responses: Vec<(u16, &str)>, delay: Duration) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            responses: Arc::new(
                responses
                    .into_iter()
                    .map(|(status, body)| (StatusCode::from_u16(status).unwrap(), body.to_string()))
                    .collect(),
            ),
            served: Arc::new(AtomicUsize::new(0)),
            delay,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/webhook", post(capture))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://127.0.0.1:{}/webhook", port),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn capture(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.requests.lock().unwrap().push(CapturedRequest {
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let n = state.served.fetch_add(1, Ordering::SeqCst);
    let (status, body) = state
        .responses
        .get(n)
        .or_else(|| state.responses.last())
        .cloned()
        .unwrap();

    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

/// A URL nothing is listening on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/webhook", port)
}
