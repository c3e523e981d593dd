//! Counsel - terminal chat client for webhook-backed counselling agents
//!
//! A setup screen registers the user's name and conversation goal with the
//! agent's setup webhook; the chat screen then exchanges messages with the
//! chat webhook. The settings record is kept in a local SQLite database and
//! gates access to the chat screen.

use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod flow;
mod settings;
mod ui;
mod webhook;

#[cfg(test)]
mod test_support;

use config::Config;
use settings::SqliteSettingsStore;
use ui::{App, Route};
use webhook::WebhookClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counsel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let profile = config.load_profile()?;

    let settings = Arc::new(SqliteSettingsStore::new(&config.database_path()).await?);
    let client = WebhookClient::new(profile.request_timeout())?;

    tracing::info!(
        "🔥 Counsel starting (setup: {}, chat: {})",
        profile.setup_endpoint,
        profile.chat_endpoint
    );

    let start = if config.resume {
        Route::Chat
    } else {
        Route::Setup
    };

    let mut app = App::new(
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        profile,
        client,
        settings,
    );
    app.run(start).await?;

    Ok(())
}
