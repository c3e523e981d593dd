//! Screen state machines
//!
//! The terminal front-end drives these; they own all the behaviour that
//! talks to the webhooks and the settings store.

mod chat;
mod setup;

pub use chat::{ChatEntry, ChatSession};
pub use setup::{SetupError, SetupFlow};
