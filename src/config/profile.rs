//! Chat profiles loaded from TOML files
//!
//! A profile defines everything that differs between deployments of the
//! client:
//! - Setup and chat webhook endpoints
//! - How the opening greeting is produced
//! - Fallback and error copy shown to the user
//! - An optional request timeout
//!
//! # Example Profile File
//!
//! ```toml
//! setup_endpoint = "https://ici.zeabur.app/webhook/FSAgent"
//! chat_endpoint = "https://ici.zeabur.app/webhook/FCAgent2"
//! initial_greeting = "fetched"
//! request_timeout_secs = 60
//!
//! [copy]
//! title = "真道AI"
//! reply_error = "很抱歉，我现在连接不上。请稍后再试。"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const SETUP_ENDPOINT: &str = "https://ici.zeabur.app/webhook/FSAgent";
const CHAT_ENDPOINT: &str = "https://ici.zeabur.app/webhook/FCAgent";
const CHAT_ENDPOINT_CN: &str = "https://ici.zeabur.app/webhook/FCAgent2";

/// How the chat screen produces its first message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialGreeting {
    /// Built locally from the greeting pools
    #[default]
    Synthesized,
    /// Requested from the chat endpoint with the sentinel message
    Fetched,
}

/// Root profile configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatProfile {
    #[serde(default = "default_setup_endpoint")]
    pub setup_endpoint: String,

    #[serde(default = "default_chat_endpoint")]
    pub chat_endpoint: String,

    #[serde(default)]
    pub initial_greeting: InitialGreeting,

    /// Upper bound on one exchange. Unset means wait indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub copy: ProfileCopy,
}

fn default_setup_endpoint() -> String {
    SETUP_ENDPOINT.to_string()
}

fn default_chat_endpoint() -> String {
    CHAT_ENDPOINT.to_string()
}

impl ChatProfile {
    /// English copy, greeting synthesized locally
    pub fn english() -> Self {
        Self {
            setup_endpoint: default_setup_endpoint(),
            chat_endpoint: default_chat_endpoint(),
            initial_greeting: InitialGreeting::Synthesized,
            request_timeout_secs: None,
            copy: ProfileCopy::default(),
        }
    }

    /// Chinese copy, greeting fetched from the agent
    pub fn chinese() -> Self {
        Self {
            setup_endpoint: default_setup_endpoint(),
            chat_endpoint: CHAT_ENDPOINT_CN.to_string(),
            initial_greeting: InitialGreeting::Fetched,
            request_timeout_secs: None,
            copy: ProfileCopy {
                title: "真道AI".to_string(),
                subtitle: "基督徒心理辅导".to_string(),
                chatting_with: "与 {name} 正在寻求".to_string(),
                reply_fallback: "我在这里帮助你。请告诉我更多。".to_string(),
                reply_error: "很抱歉，我现在连接不上。请稍后再试。".to_string(),
                greeting_fallback: "愿你平安，我在这里陪伴你。".to_string(),
                greeting_error: "愿你平安，我在这里陪伴你。有什么我可以帮助你的吗？".to_string(),
                setup_failed: default_setup_failed(),
                leave_confirm: "你确定要返回设置吗？你当前的对话将丢失。".to_string(),
            },
        }
    }

    /// Resolve a built-in profile name, or load a TOML file at that path
    pub fn resolve(name_or_path: &str) -> Result<Self, ConfigError> {
        match name_or_path.to_lowercase().as_str() {
            "english" | "en" => Ok(Self::english()),
            "chinese" | "zh" => Ok(Self::chinese()),
            _ => Self::from_file(Path::new(name_or_path)),
        }
    }

    /// Load a profile from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a profile from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let profile: ChatProfile = toml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.setup_endpoint.is_empty() || self.chat_endpoint.is_empty() {
            return Err(ConfigError::Validation("endpoints must not be empty".into()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ChatProfile {
    fn default() -> Self {
        Self::english()
    }
}

/// User-facing strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileCopy {
    pub title: String,
    pub subtitle: String,

    /// Chat header line; `{name}` is replaced by the username
    pub chatting_with: String,

    /// Reply text when the agent's response shape is unrecognized
    pub reply_fallback: String,

    /// Reply text when the exchange fails
    pub reply_error: String,

    /// Fetched greeting when the response shape is unrecognized
    pub greeting_fallback: String,

    /// Fetched greeting when the exchange fails
    pub greeting_error: String,

    /// Alert shown when setup fails
    pub setup_failed: String,

    /// Confirmation before leaving the chat screen
    pub leave_confirm: String,
}

fn default_setup_failed() -> String {
    "Failed to connect to the webhook. Please check the console for details.".to_string()
}

impl Default for ProfileCopy {
    fn default() -> Self {
        Self {
            title: "Faith Counsel AI".to_string(),
            subtitle: "The christian therapist".to_string(),
            chatting_with: "Chatting with {name}".to_string(),
            reply_fallback: "I'm here to help. Please tell me more.".to_string(),
            reply_error: "I apologize, but I'm having trouble connecting right now. Please try again in a moment.".to_string(),
            greeting_fallback: "Peace be with you. I'm here with you.".to_string(),
            greeting_error: "Peace be with you. I'm here with you. How can I help you today?".to_string(),
            setup_failed: default_setup_failed(),
            leave_confirm: "Are you sure you want to go back to setup? Your current conversation will be lost.".to_string(),
        }
    }
}

impl ProfileCopy {
    pub fn chatting_with(&self, name: &str) -> String {
        self.chatting_with.replace("{name}", name)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
