//! Terminal front-end
//!
//! Two routes, setup and chat, rendered as plain line-oriented screens. Input
//! is any async line source and output any writer, so the whole navigation
//! loop can be driven from tests.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::config::{ChatProfile, InitialGreeting};
use crate::conversation::{Message, Role};
use crate::flow::{ChatEntry, ChatSession, SetupError, SetupFlow};
use crate::settings::SettingsRepository;
use crate::webhook::WebhookClient;

const TYPING_INDICATOR: &str = "  ...";
const CMD_SETUP: &str = "/setup";
const CMD_QUIT: &str = "/quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Setup,
    Chat,
    Quit,
}

pub struct App<R, W> {
    input: Lines<R>,
    out: W,
    profile: ChatProfile,
    client: WebhookClient,
    settings: Arc<dyn SettingsRepository>,
}

impl<R, W> App<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(
        input: R,
        out: W,
        profile: ChatProfile,
        client: WebhookClient,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            input: input.lines(),
            out,
            profile,
            client,
            settings,
        }
    }

    /// Run screens until the user quits or input ends
    pub async fn run(&mut self, start: Route) -> io::Result<()> {
        let mut route = start;
        loop {
            tracing::debug!("Navigating to {:?}", route);
            route = match route {
                Route::Setup => self.setup_screen().await?,
                Route::Chat => self.chat_screen().await?,
                Route::Quit => return Ok(()),
            };
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    async fn setup_screen(&mut self) -> io::Result<Route> {
        let copy = self.profile.copy.clone();
        writeln!(self.out, "\n✨ {}", copy.title)?;
        writeln!(self.out, "{}\n", copy.subtitle)?;

        let mut flow = SetupFlow::new(
            self.profile.setup_endpoint.clone(),
            self.client.clone(),
            self.settings.clone(),
        );

        loop {
            let Some(username) = self.read_field("Username", &flow.form().username).await? else {
                return Ok(Route::Quit);
            };
            flow.set_username(username);

            let Some(goal) = self.read_field("Chat Goal", &flow.form().chat_goal).await? else {
                return Ok(Route::Quit);
            };
            flow.set_chat_goal(goal);

            writeln!(self.out, "Setting up agent...")?;
            match flow.submit().await {
                Ok(_) => return Ok(Route::Chat),
                Err(SetupError::Incomplete) => continue,
                Err(e) => {
                    tracing::debug!("Setup failed: {}", e);
                    writeln!(self.out, "⚠ {}", copy.setup_failed)?;
                }
            }
        }
    }

    async fn chat_screen(&mut self) -> io::Result<Route> {
        let entry = ChatSession::open(
            self.settings.as_ref(),
            self.client.clone(),
            self.profile.clone(),
        )
        .await;

        let mut session = match entry {
            ChatEntry::Ready(session) => session,
            ChatEntry::Redirect => return Ok(Route::Setup),
        };

        if self.profile.initial_greeting == InitialGreeting::Fetched {
            writeln!(self.out, "{}", TYPING_INDICATOR)?;
        }
        session.greet().await;

        let copy = self.profile.copy.clone();
        writeln!(self.out, "\n✨ {}", copy.title)?;
        writeln!(self.out, "{}", copy.chatting_with(&session.settings().username))?;
        writeln!(self.out, "({} to go back, {} to exit)\n", CMD_SETUP, CMD_QUIT)?;

        for message in session.transcript().messages() {
            self.print_message(message)?;
        }

        loop {
            let Some(line) = self.read_line("> ").await? else {
                return Ok(Route::Quit);
            };

            match line.trim() {
                CMD_QUIT => return Ok(Route::Quit),
                CMD_SETUP => {
                    if self.confirm(&copy.leave_confirm).await? {
                        return Ok(Route::Setup);
                    }
                    continue;
                }
                "" => continue,
                _ => {}
            }

            writeln!(self.out, "{}", TYPING_INDICATOR)?;
            if let Some(reply) = session.send(&line).await {
                self.print_message(reply)?;
            }
        }
    }

    fn print_message(&mut self, message: &Message) -> io::Result<()> {
        let time = message.timestamp.with_timezone(&Local).format("%H:%M");
        let who = match message.role {
            Role::User => "You",
            Role::Assistant => self.profile.copy.title.as_str(),
        };
        writeln!(self.out, "[{}] {}:\n{}\n", time, who, message.content)
    }

    /// Prompt for a form field. Blank input keeps the current value.
    async fn read_field(&mut self, label: &str, current: &str) -> io::Result<Option<String>> {
        loop {
            let prompt = if current.is_empty() {
                format!("{}: ", label)
            } else {
                format!("{} [{}]: ", label, current)
            };

            let Some(line) = self.read_line(&prompt).await? else {
                return Ok(None);
            };

            let value = line.trim();
            if !value.is_empty() {
                return Ok(Some(value.to_string()));
            }
            if !current.is_empty() {
                return Ok(Some(current.to_string()));
            }
        }
    }

    async fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.read_line(&format!("{} [y/N] ", question)).await?;
        Ok(answer.is_some_and(|a| matches!(a.trim().to_lowercase().as_str(), "y" | "yes")))
    }

    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        self.input.next_line().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::UserSettings;
    use crate::test_support::{MemorySettings, MockWebhook};

    fn profile(setup: &MockWebhook, chat: &MockWebhook) -> ChatProfile {
        ChatProfile {
            setup_endpoint: setup.url.clone(),
            chat_endpoint: chat.url.clone(),
            ..ChatProfile::english()
        }
    }

    async fn run(
        script: &'static str,
        profile: ChatProfile,
        settings: Arc<MemorySettings>,
        start: Route,
    ) -> String {
        let mut app = App::new(
            script.as_bytes(),
            Vec::new(),
            profile,
            WebhookClient::new(None).unwrap(),
            settings,
        );
        app.run(start).await.unwrap();
        String::from_utf8(app.into_output()).unwrap()
    }

    #[tokio::test]
    async fn test_setup_then_chat() {
        let setup = MockWebhook::start(200, "{}").await;
        let chat = MockWebhook::start(200, r#"[{"output":"Tell me more."}]"#).await;
        let store = Arc::new(MemorySettings::new());

        let out = run(
            "Ada\nFind peace\nI'm worried\n/quit\n",
            profile(&setup, &chat),
            store.clone(),
            Route::Setup,
        )
        .await;

        assert!(out.contains("Chatting with Ada"));
        assert!(out.contains("Tell me more."));
        assert_eq!(store.load().await, Some(UserSettings::new("Ada", "Find peace")));
        assert_eq!(chat.requests()[0].body["userMessage"], "I'm worried");
    }

    #[tokio::test]
    async fn test_chat_without_settings_redirects_to_setup() {
        let setup = MockWebhook::start(200, "{}").await;
        let chat = MockWebhook::start(200, r#"{"output":"hi"}"#).await;
        let store = Arc::new(MemorySettings::new());

        let out = run("", profile(&setup, &chat), store, Route::Chat).await;

        assert!(out.contains("Username: "));
        assert!(!out.contains("Chatting with"));
        assert!(chat.requests().is_empty());
    }

    #[tokio::test]
    async fn test_redirect_shows_no_typing_indicator() {
        let setup = MockWebhook::start(200, "{}").await;
        let chat = MockWebhook::start(200, r#"{"output":"hi"}"#).await;
        let store = Arc::new(MemorySettings::new());
        let profile = ChatProfile {
            initial_greeting: InitialGreeting::Fetched,
            ..profile(&setup, &chat)
        };

        let out = run("", profile, store, Route::Chat).await;

        assert!(out.starts_with("\n✨ Faith Counsel AI"));
        assert!(!out.contains(TYPING_INDICATOR));
        assert!(chat.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetched_greeting_shows_typing_indicator() {
        let setup = MockWebhook::start(200, "{}").await;
        let chat = MockWebhook::start(200, r#"{"output":"愿你平安"}"#).await;
        let store = Arc::new(MemorySettings::new());
        store.save(&UserSettings::new("Ada", "Find peace")).await.unwrap();
        let profile = ChatProfile {
            initial_greeting: InitialGreeting::Fetched,
            ..profile(&setup, &chat)
        };

        let out = run("/quit\n", profile, store, Route::Chat).await;

        let typing = out.find(TYPING_INDICATOR).unwrap();
        assert!(typing < out.find("愿你平安").unwrap());
        assert_eq!(chat.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_setup_failure_alerts_and_keeps_fields() {
        let setup = MockWebhook::start_with(vec![(500, "{}"), (200, "{}")]).await;
        let chat = MockWebhook::start(200, r#"{"output":"hi"}"#).await;
        let store = Arc::new(MemorySettings::new());

        let out = run(
            "Ada\nFind peace\n\n\n/quit\n",
            profile(&setup, &chat),
            store.clone(),
            Route::Setup,
        )
        .await;

        assert!(out.contains("Failed to connect to the webhook."));
        assert!(out.contains("Username [Ada]: "));
        assert_eq!(setup.requests().len(), 2);
        assert_eq!(setup.requests()[1].body["chatGoal"], "Find peace");
        assert!(store.load().await.is_some());
    }

    #[tokio::test]
    async fn test_leave_chat_requires_confirmation() {
        let setup = MockWebhook::start(200, "{}").await;
        let chat = MockWebhook::start(200, r#"{"output":"hi"}"#).await;
        let store = Arc::new(MemorySettings::new());
        store.save(&UserSettings::new("Ada", "Find peace")).await.unwrap();

        let out = run(
            "/setup\nn\n/setup\ny\n",
            profile(&setup, &chat),
            store,
            Route::Chat,
        )
        .await;

        assert_eq!(out.matches("Are you sure you want to go back to setup?").count(), 2);
        assert!(out.contains("The christian therapist"));
        assert!(chat.requests().is_empty());
    }
}
