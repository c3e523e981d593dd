//! User settings record and its storage
//!
//! The settings record gates the chat screen. It is stored as a single JSON
//! value under one fixed key and always replaced wholesale.

mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use sqlite::SqliteSettingsStore;

/// Key the settings record is stored under
pub const SETTINGS_KEY: &str = "userSettings";

/// The persisted username/goal pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub username: String,
    pub chat_goal: String,
}

impl UserSettings {
    pub fn new(username: impl Into<String>, chat_goal: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            chat_goal: chat_goal.into(),
        }
    }

    /// Both fields present
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.chat_goal.is_empty()
    }

    /// Parse a stored record. Anything that is not a complete record is absent.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<UserSettings>(raw) {
            Ok(settings) if settings.is_complete() => Some(settings),
            Ok(_) => {
                tracing::warn!("Stored settings have an empty field, ignoring");
                None
            }
            Err(e) => {
                tracing::warn!("Stored settings failed to parse: {}", e);
                None
            }
        }
    }
}

/// Settings storage errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable storage for the settings record
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Replace the stored record
    async fn save(&self, settings: &UserSettings) -> Result<(), SettingsError>;

    /// Read the stored record. Missing, unreadable and malformed records
    /// are all reported as `None`.
    async fn load(&self) -> Option<UserSettings>;
}
