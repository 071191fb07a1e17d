//! Conversation and message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::text::string::truncate_with_ellipsis;

/// Title given to fresh and cleared conversations
pub const DEFAULT_TITLE: &str = "New conversation";

/// Preview shown for a conversation without messages
pub const EMPTY_PREVIEW: &str = "Start a new conversation...";

const TITLE_MAX_CHARS: usize = 20;
const PREVIEW_MAX_CHARS: usize = 50;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Label used in transcripts and the message list
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One turn in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A titled, append-only log of messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation with the default title
    pub fn new(id: String) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a message. Returns `true` when this append fixed the title,
    /// which happens once: when the assistant answers the first user message.
    pub fn push(&mut self, message: Message) -> bool {
        let completes_first_exchange = message.role == MessageRole::Assistant;
        self.messages.push(message);

        if !completes_first_exchange || self.messages.len() != 2 {
            return false;
        }

        match self.messages.first() {
            Some(first) if first.role == MessageRole::User => {
                self.title = derive_title(&first.content);
                true
            }
            _ => false,
        }
    }

    /// Drop all messages and go back to the placeholder title
    pub fn clear(&mut self) {
        self.messages.clear();
        self.title = DEFAULT_TITLE.to_string();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Last assistant reply, if any
    pub fn last_reply(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }

    /// Short preview of the latest message for the history list
    pub fn preview(&self) -> String {
        match self.last_message() {
            Some(message) => truncate_with_ellipsis(&message.content, PREVIEW_MAX_CHARS),
            None => EMPTY_PREVIEW.to_string(),
        }
    }
}

/// Title derived from the first user message
pub fn derive_title(first_message: &str) -> String {
    truncate_with_ellipsis(first_message, TITLE_MAX_CHARS)
}
