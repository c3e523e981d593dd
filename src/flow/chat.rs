//! Chat screen state machine
//!
//! The session is only constructed once a settings record has been loaded.
//! Every exchange ends with exactly one assistant message appended, whether
//! the agent answered or not, and the session returns to `Idle`.

use crate::config::greetings;
use crate::config::{ChatProfile, InitialGreeting};
use crate::conversation::{HistoryEntry, Message, Transcript};
use crate::settings::{SettingsRepository, UserSettings};
use crate::webhook::{ChatPayload, ReplyShape, WebhookClient};

/// Message sent to ask the agent for its opening line
pub const GREETING_SENTINEL: &str = "Hi";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    LoadingSettings,
    Idle,
    AwaitingReply,
}

/// Outcome of entering the chat screen
pub enum ChatEntry {
    /// No usable settings; go back to setup
    Redirect,
    Ready(ChatSession),
}

pub struct ChatSession {
    settings: UserSettings,
    profile: ChatProfile,
    client: WebhookClient,
    transcript: Transcript,
    state: ChatState,
}

impl ChatSession {
    /// Enter the chat screen.
    ///
    /// Redirects before any network traffic when settings are missing. A
    /// ready session has an empty transcript until [`ChatSession::greet`].
    pub async fn open(
        settings: &dyn SettingsRepository,
        client: WebhookClient,
        profile: ChatProfile,
    ) -> ChatEntry {
        let Some(settings) = settings.load().await else {
            tracing::info!("No settings found, redirecting to setup");
            return ChatEntry::Redirect;
        };

        ChatEntry::Ready(Self {
            settings,
            profile,
            client,
            transcript: Transcript::default(),
            state: ChatState::LoadingSettings,
        })
    }

    /// Seed the transcript with the opening message and start accepting input
    pub async fn greet(&mut self) -> &Message {
        let greeting = self.greeting().await;
        self.transcript = Transcript::with_greeting(greeting);
        self.state = ChatState::Idle;
        &self.transcript.messages()[0]
    }

    async fn greeting(&self) -> Message {
        match self.profile.initial_greeting {
            InitialGreeting::Synthesized => {
                let text = greetings::welcome_text(&self.settings.username, &mut rand::thread_rng());
                Message::assistant(text)
            }
            InitialGreeting::Fetched => {
                tracing::info!("Fetching initial greeting");
                let copy = &self.profile.copy;
                let text = self
                    .exchange(
                        GREETING_SENTINEL,
                        Vec::new(),
                        &copy.greeting_fallback,
                        &copy.greeting_error,
                    )
                    .await;
                Message::assistant(text)
            }
        }
    }

    /// Send a user message and wait for the agent's reply.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the user message
    /// and then the reply are appended, and the reply is returned.
    pub async fn send(&mut self, input: &str) -> Option<&Message> {
        if input.trim().is_empty() {
            return None;
        }

        let history = self.transcript.history();
        self.transcript.push(Message::user(input));
        self.state = ChatState::AwaitingReply;

        let copy = &self.profile.copy;
        let text = self
            .exchange(input, history, &copy.reply_fallback, &copy.reply_error)
            .await;

        self.transcript.push(Message::assistant(text));
        self.state = ChatState::Idle;
        self.transcript.last()
    }

    async fn exchange(
        &self,
        message: &str,
        history: Vec<HistoryEntry>,
        fallback: &str,
        on_error: &str,
    ) -> String {
        let payload = ChatPayload::new(&self.settings, message, history);

        match self.client.post_chat(&self.profile.chat_endpoint, &payload).await {
            Ok(data) => {
                let shape = ReplyShape::parse(&data);
                if shape == ReplyShape::Unrecognized {
                    tracing::debug!("Unrecognized reply shape, using fallback");
                }
                shape.into_text_or(fallback)
            }
            Err(e) => {
                tracing::error!("❌ Error calling chat webhook: {}", e);
                on_error.to_string()
            }
        }
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    #[cfg(test)]
    pub fn profile(&self) -> &ChatProfile {
        &self.profile
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[cfg(test)]
    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Whether the input box accepts a new message
    #[cfg(test)]
    pub fn accepts_input(&self) -> bool {
        self.state == ChatState::Idle
    }
}
