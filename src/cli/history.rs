//! Read and tidy the saved conversation history

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Args;
use std::io::{self, Write};

use crate::{
    app::{ChatApp, StdinConfirm},
    config::Config,
    session::{transcript, Conversation, StoreError},
    utils::text::time::relative_time,
};

/// List saved conversations, newest first
#[derive(Args)]
pub struct ListCommand {}

impl ListCommand {
    pub fn execute(&self, config: &Config, ephemeral: bool) -> Result<()> {
        let (app, _events) = ChatApp::from_config(config, ephemeral)?;
        let stdout = io::stdout();
        write_list(&app, &mut stdout.lock())
    }
}

fn write_list(app: &ChatApp, out: &mut impl Write) -> Result<()> {
    let now = Utc::now();
    let active = app.store().active_id();

    for conv in app.store().conversations() {
        let marker = if Some(conv.id.as_str()) == active { '*' } else { ' ' };
        let updated = conv.last_message().map_or(conv.created_at, |m| m.timestamp);
        writeln!(
            out,
            "{} {}  {} ({} messages, {})",
            marker,
            conv.id,
            conv.title,
            conv.messages.len(),
            relative_time(updated, now)
        )?;
        writeln!(out, "    {}", conv.preview())?;
    }
    Ok(())
}

/// Print a conversation
#[derive(Args)]
pub struct ShowCommand {
    /// Conversation id; defaults to the most recent one
    pub id: Option<String>,
}

impl ShowCommand {
    pub fn execute(&self, config: &Config, ephemeral: bool) -> Result<()> {
        let (app, _events) = ChatApp::from_config(config, ephemeral)?;
        let conversation = find(&app, self.id.as_deref())?;

        match transcript::render(conversation) {
            Ok(text) => print!("{}", text),
            Err(StoreError::EmptyConversation) => println!("{} has no messages yet", conversation.title),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

/// Clear the most recent conversation
#[derive(Args)]
pub struct ClearCommand {
    /// Don't ask for confirmation
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

impl ClearCommand {
    pub fn execute(&self, config: &Config, ephemeral: bool) -> Result<()> {
        let (mut app, _events) = ChatApp::from_config(config, ephemeral)?;

        let cleared = if self.yes {
            app.clear(&|_: &str| true)?
        } else {
            app.clear(&StdinConfirm)?
        };

        if cleared {
            println!("Conversation cleared");
        } else {
            println!("Nothing cleared");
        }
        Ok(())
    }
}

pub(super) fn find<'a>(app: &'a ChatApp, id: Option<&str>) -> Result<&'a Conversation> {
    let found = match id {
        Some(id) => app.store().get(id),
        None => app.store().active(),
    };
    found.ok_or_else(|| anyhow!(StoreError::UnknownConversation(id.unwrap_or_default().to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            data_dir: dir.to_path_buf(),
            export_dir: dir.to_path_buf(),
            think_base_ms: 0,
            think_jitter_ms: 0,
            seed: Some(1),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_list_marks_active_conversation() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        {
            let (mut app, _events) = ChatApp::from_config(&config, false).unwrap();
            app.send_message("hello").await.unwrap();
            app.new_conversation();
        }

        let (app, _events) = ChatApp::from_config(&config, false).unwrap();
        let mut out = Vec::new();
        write_list(&app, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("* "));
        assert!(lines[0].contains("New conversation (0 messages, just now)"));
        assert!(lines[1].contains(crate::session::EMPTY_PREVIEW));
        assert!(lines[2].contains("hello (2 messages"));
    }

    #[test]
    fn test_find_unknown_id_fails() {
        let dir = tempdir().unwrap();
        let (app, _events) = ChatApp::from_config(&config_in(dir.path()), true).unwrap();

        assert!(find(&app, None).is_ok());
        let err = find(&app, Some("missing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::UnknownConversation(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_clear_with_yes_empties_conversation() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        {
            let (mut app, _events) = ChatApp::from_config(&config, false).unwrap();
            app.send_message("hello").await.unwrap();
        }

        ClearCommand { yes: true }.execute(&config, false).unwrap();

        let (app, _events) = ChatApp::from_config(&config, false).unwrap();
        assert!(app.store().active().unwrap().is_empty());
    }
}
