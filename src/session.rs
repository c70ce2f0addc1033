//! Per-session conversation log and turn handling.
//!
//! A [`Conversation`] is owned by whoever runs the session (the console
//! channel, or the HTTP session table). [`take_turn`] consumes it and hands
//! it back with the new user/assistant pair appended, so no transcript
//! state lives inside the matcher.
//!
//! Transcript Markdown uses `### {role} — {timestamp}` delimiters.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::IntentMatcher;
use crate::knowledge::{CategoryId, Locale};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// RFC 3339 UTC, second precision.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    id: Uuid,
    locale: Locale,
    started_at: String,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(locale: Locale) -> Self {
        Self {
            id: Uuid::new_v4(),
            locale,
            started_at: now_rfc3339(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    /// Switch the active locale. Earlier messages keep their language.
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, role: Role, text: impl Into<String>) {
        self.messages.push(Message {
            role,
            text: text.into(),
            timestamp: now_rfc3339(),
        });
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for m in &self.messages {
            out.push_str(&format!("### {} — {}\n\n{}\n\n", m.role.as_str(), m.timestamp, m.text));
        }
        out
    }
}

/// Outcome of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub category: CategoryId,
    pub reply: &'static str,
}

/// Classify `text` in the conversation's locale, append the user message
/// and the reply, and return the conversation.
pub fn take_turn(
    mut conversation: Conversation,
    text: &str,
    matcher: &IntentMatcher,
) -> (Conversation, Turn) {
    let locale = conversation.locale;
    let category = matcher.classify(text, locale);
    let reply = matcher.response_for(category, locale);

    conversation.push(Role::User, text);
    conversation.push(Role::Assistant, reply);

    (conversation, Turn { category, reply })
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
