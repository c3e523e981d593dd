//! Built-in welcome message pools
//!
//! A synthesized greeting is one comforting verse followed by one opening
//! line addressed to the user.

use rand::seq::SliceRandom;
use rand::Rng;

/// Name used when the settings carry no username
pub const DEFAULT_NAME: &str = "friend";

pub const VERSES: &[&str] = &[
    r#""Do not fear, for I am with you." (Isaiah 41:10)"#,
    r#""Cast all your anxiety on him because he cares for you." (1 Peter 5:7)"#,
    r#""The Lord is my shepherd; I shall not want." (Psalm 23:1)"#,
    r#""Come to me, all you who are weary and burdened." (Matthew 11:28)"#,
    r#""My grace is sufficient for you." (2 Corinthians 12:9)"#,
    r#""I have loved you with an everlasting love." (Jeremiah 31:3)"#,
    r#""The Lord is near to the brokenhearted." (Psalm 34:18)"#,
    r#""Peace I leave with you; my peace I give you." (John 14:27)"#,
    r#""God is our refuge and strength, an ever-present help in trouble." (Psalm 46:1)"#,
    r#""Nothing will be able to separate us from the love of God." (Romans 8:39)"#,
];

/// Opening lines; `{name}` is replaced by the bolded username
pub const OPENINGS: &[&str] = &[
    "Peace be with you, {name}. What's on your heart today?",
    "Hi {name}, I'm here with you. How can I pray with you today?",
    "{name}, you're not alone. What would you like to share?",
    "Good to see you, {name}. Where do you need comfort or guidance right now?",
    "Welcome, {name}. How are you really doing today?",
    "I'm glad you're here, {name}. What burden are you carrying that we can talk about?",
    "Dear {name}, let's bring your worries into the light. What's weighing on you?",
    "{name}, take a deep breath. What situation would you like to talk through together?",
    "Hello {name}. In this moment, you are seen and loved. What would you like to say?",
    "Thank you for coming, {name}. How can I support you right now?",
];

/// Build a welcome text for `username` using `rng` for selection
pub fn welcome_text<R: Rng + ?Sized>(username: &str, rng: &mut R) -> String {
    let name = if username.is_empty() {
        DEFAULT_NAME
    } else {
        username
    };
    let verse = VERSES.choose(rng).copied().unwrap_or_default();
    let opening = OPENINGS
        .choose(rng)
        .copied()
        .unwrap_or_default()
        .replace("{name}", &format!("**{}**", name));

    format!("{}\n\n{}", verse, opening)
}
