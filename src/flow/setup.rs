//! Setup screen state machine
//!
//! `Editing -> Submitting -> Done` on success, `Submitting -> Editing` on any
//! failure so the user can resubmit.

use std::sync::Arc;

use crate::settings::{SettingsError, SettingsRepository, UserSettings};
use crate::webhook::{WebhookClient, WebhookError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    Editing,
    Submitting,
    Done,
}

/// Errors from submitting the setup form
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Username and chat goal are both required")]
    Incomplete,

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

pub struct SetupFlow {
    form: UserSettings,
    state: SetupState,
    endpoint: String,
    client: WebhookClient,
    settings: Arc<dyn SettingsRepository>,
}

impl SetupFlow {
    /// Start editing an empty form
    pub fn new(
        endpoint: impl Into<String>,
        client: WebhookClient,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            form: UserSettings::new("", ""),
            state: SetupState::Editing,
            endpoint: endpoint.into(),
            client,
            settings,
        }
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.form.username = username.into();
    }

    pub fn set_chat_goal(&mut self, chat_goal: impl Into<String>) {
        self.form.chat_goal = chat_goal.into();
    }

    pub fn form(&self) -> &UserSettings {
        &self.form
    }

    #[cfg(test)]
    pub fn state(&self) -> SetupState {
        self.state
    }

    pub fn can_submit(&self) -> bool {
        self.state == SetupState::Editing && self.form.is_complete()
    }

    /// Register the form with the setup endpoint and persist it.
    ///
    /// Settings are only written after the endpoint accepted them.
    pub async fn submit(&mut self) -> Result<&UserSettings, SetupError> {
        if !self.can_submit() {
            return Err(SetupError::Incomplete);
        }

        self.state = SetupState::Submitting;

        match self.register().await {
            Ok(()) => {
                self.state = SetupState::Done;
                tracing::info!("Setup complete for {}", self.form.username);
                Ok(&self.form)
            }
            Err(e) => {
                tracing::error!("❌ Error calling setup webhook: {}", e);
                self.state = SetupState::Editing;
                Err(e)
            }
        }
    }

    async fn register(&self) -> Result<(), SetupError> {
        self.client.post_setup(&self.endpoint, &self.form).await?;
        self.settings.save(&self.form).await?;
        Ok(())
    }
}
