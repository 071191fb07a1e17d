//! Application events for the event-driven architecture

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::session::MessageRole;

/// State changes published by the store for the view layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// The conversation list changed (created, retitled, cleared)
    ConversationsChanged,

    /// A different conversation is now active
    ActiveConversationChanged {
        conversation_id: String,
    },

    /// A message was appended to a conversation
    MessageAppended {
        conversation_id: String,
        role: MessageRole,
    },

    /// A conversation received its title
    TitleChanged {
        conversation_id: String,
        title: String,
    },

    /// A conversation was emptied
    ConversationCleared {
        conversation_id: String,
    },

    /// A reply started or finished "thinking"
    BusyChanged {
        busy: bool,
    },

    /// A transcript was written
    Exported {
        path: PathBuf,
    },

    /// A user-visible failure
    Error {
        error: String,
    },
}

impl AppEvent {
    /// Get the conversation ID associated with this event, if any
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            AppEvent::ActiveConversationChanged { conversation_id }
            | AppEvent::MessageAppended { conversation_id, .. }
            | AppEvent::TitleChanged { conversation_id, .. }
            | AppEvent::ConversationCleared { conversation_id } => Some(conversation_id),
            AppEvent::ConversationsChanged
            | AppEvent::BusyChanged { .. }
            | AppEvent::Exported { .. }
            | AppEvent::Error { .. } => None,
        }
    }

    /// Check if this event is an error
    pub fn is_error(&self) -> bool {
        matches!(self, AppEvent::Error { .. })
    }
}

/// Input captured by a view and dispatched to the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    /// Send the typed message
    Submit(String),
    /// Start a new conversation
    NewConversation,
    /// Show another conversation
    Select(String),
    /// Clear the active conversation with the answer the view's dialog got
    Clear { confirmed: bool },
    /// Export the active conversation
    Export,
    /// Send one of the suggested prompts
    Suggestion(usize),
}
