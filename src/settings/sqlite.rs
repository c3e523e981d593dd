//! Settings storage using SQLite
//!
//! A single key/value table; the settings record lives under [`SETTINGS_KEY`].

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use super::{SettingsError, SettingsRepository, UserSettings, SETTINGS_KEY};

/// Durable settings store
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open (or create) the store at the given SQLite database path
    pub async fn new(db_path: &Path) -> Result<Self, SettingsError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self, SettingsError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Write raw text under the settings key
    pub async fn put_raw(&self, value: &str) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(SETTINGS_KEY)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read the raw text under the settings key
    pub async fn get_raw(&self) -> Result<Option<String>, SettingsError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(SETTINGS_KEY)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsStore {
    async fn save(&self, settings: &UserSettings) -> Result<(), SettingsError> {
        let raw = serde_json::to_string(settings)?;
        self.put_raw(&raw).await?;
        tracing::debug!("Saved settings for {}", settings.username);
        Ok(())
    }

    async fn load(&self) -> Option<UserSettings> {
        match self.get_raw().await {
            Ok(Some(raw)) => UserSettings::parse(&raw),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read settings: {}", e);
                None
            }
        }
    }
}
