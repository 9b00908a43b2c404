//! Append-only chat transcript

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::locale::Locale;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry; immutable once appended
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Role,
    /// Language the message was written in, used for replay
    pub locale: Locale,
    pub created_at: DateTime<Utc>,
}

/// Ordered message history for one session
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its index
    pub fn push(&mut self, text: impl Into<String>, sender: Role, locale: Locale) -> usize {
        self.messages.push(ChatMessage {
            text: text.into(),
            sender,
            locale,
            created_at: Utc::now(),
        });
        self.messages.len() - 1
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
