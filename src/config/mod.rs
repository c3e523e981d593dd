//! Application configuration

pub mod greetings;
pub mod profile;

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use profile::{ChatProfile, ConfigError, InitialGreeting};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the settings database
    pub data_dir: PathBuf,
    /// Built-in profile name or path to a TOML profile
    pub profile: String,
    pub setup_url: Option<String>,
    pub chat_url: Option<String>,
    /// Open the chat screen first instead of setup
    pub resume: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            data_dir: env::var("COUNSEL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            profile: env::var("COUNSEL_PROFILE").unwrap_or_else(|_| "english".into()),
            setup_url: env::var("COUNSEL_SETUP_URL").ok(),
            chat_url: env::var("COUNSEL_CHAT_URL").ok(),
            resume: env::var("COUNSEL_RESUME")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        })
    }

    /// Resolve the profile and apply endpoint overrides
    pub fn load_profile(&self) -> Result<ChatProfile, ConfigError> {
        let mut profile = ChatProfile::resolve(&self.profile)?;
        if let Some(url) = &self.setup_url {
            profile.setup_endpoint = url.clone();
        }
        if let Some(url) = &self.chat_url {
            profile.chat_endpoint = url.clone();
        }
        Ok(profile)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("counsel.db")
    }
}

/// Boolean env flag: `1`, `true`, `yes` or `on`, any case
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
