//! Plain-text conversation export

use chrono::{Local, TimeZone};
use std::fmt::Display;

use super::{
    conversation::Conversation,
    errors::{StoreError, StoreResult},
};

pub const APP_NAME: &str = "Zed AI";
const SEPARATOR_WIDTH: usize = 50;

/// Suggested file name for an exported conversation
pub fn export_filename(conversation: &Conversation) -> String {
    format!("zed-ai-chat-{}.txt", conversation.id)
}

/// Render a transcript using the local time zone
pub fn render(conversation: &Conversation) -> StoreResult<String> {
    render_in(conversation, &Local)
}

/// Render a transcript with timestamps shown in `tz`
pub fn render_in<Tz>(conversation: &Conversation, tz: &Tz) -> StoreResult<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if conversation.is_empty() {
        return Err(StoreError::EmptyConversation);
    }

    let mut out = String::new();
    out.push_str(&format!("{} conversation export\n", APP_NAME));
    out.push_str(&format!("Title: {}\n", conversation.title));
    out.push_str(&format!(
        "Date: {}\n",
        conversation.created_at.with_timezone(tz).format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&"=".repeat(SEPARATOR_WIDTH));
    out.push_str("\n\n");

    for message in &conversation.messages {
        out.push_str(&format!(
            "[{}] {}: {}\n\n",
            message.timestamp.with_timezone(tz).format("%H:%M:%S"),
            message.role.label(),
            message.content
        ));
    }

    Ok(out)
}
