//! Webhook client for the remote agent
//!
//! Two endpoints are involved: the setup endpoint receives the settings
//! record once, the chat endpoint receives every user message together with
//! the conversation so far. Both are plain JSON POSTs without auth.

pub mod reply;

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::conversation::HistoryEntry;
use crate::settings::UserSettings;

pub use reply::ReplyShape;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Invalid response body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Body sent to the chat endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload<'a> {
    pub user_message: &'a str,
    pub username: &'a str,
    pub chat_goal: &'a str,
    pub conversation_history: Vec<HistoryEntry>,
}

impl<'a> ChatPayload<'a> {
    pub fn new(
        settings: &'a UserSettings,
        user_message: &'a str,
        conversation_history: Vec<HistoryEntry>,
    ) -> Self {
        Self {
            user_message,
            username: &settings.username,
            chat_goal: &settings.chat_goal,
            conversation_history,
        }
    }
}

/// HTTP client shared by the setup and chat screens
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    /// Build a client. `timeout` bounds each exchange; `None` waits forever.
    pub fn new(timeout: Option<Duration>) -> Result<Self, WebhookError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Register the settings with the setup endpoint.
    ///
    /// Any 2xx is success. The body is only logged; a body that is not JSON
    /// is reported as `None` rather than an error.
    pub async fn post_setup(
        &self,
        url: &str,
        settings: &UserSettings,
    ) -> Result<Option<Value>, WebhookError> {
        tracing::info!("🚀 Sending settings to webhook: {}", url);
        tracing::debug!("📦 Payload: {:?}", settings);

        let text = self.post_json(url, settings).await?;
        match serde_json::from_str::<Value>(&text) {
            Ok(data) => {
                tracing::debug!("✅ Response data: {}", data);
                Ok(Some(data))
            }
            Err(e) => {
                tracing::warn!("Setup webhook body is not JSON: {}", e);
                Ok(None)
            }
        }
    }

    /// Send one chat exchange and return the decoded reply body
    pub async fn post_chat(
        &self,
        url: &str,
        payload: &ChatPayload<'_>,
    ) -> Result<Value, WebhookError> {
        tracing::info!("💬 Sending message to chat webhook: {}", url);
        tracing::debug!(
            "📦 Payload: message={:?} history_len={}",
            payload.user_message,
            payload.conversation_history.len()
        );

        let text = self.post_json(url, payload).await?;
        let data: Value = serde_json::from_str(&text)?;
        tracing::debug!("✅ Response data: {}", data);
        Ok(data)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<String, WebhookError> {
        // .json() sets Content-Type: application/json
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        tracing::debug!("📡 Response status: {}", status);

        if !status.is_success() {
            return Err(WebhookError::Status(status));
        }

        Ok(response.text().await?)
    }
}
