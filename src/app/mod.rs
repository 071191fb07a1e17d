//! Core application logic and orchestration
//!
//! This module provides the application context that ties the conversation
//! store to reply generation, the thinking delay and the export sink. Views
//! (the TUI and the one-shot CLI commands) drive it and listen to its events.

mod collaborators;
mod events;

pub use collaborators::*;
pub use events::*;

use anyhow::Result;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    responder::{ResponseGenerator, RngSource, ThinkingDelay, SUGGESTED_PROMPTS},
    session::{
        ConversationStore, FileStorage, IdGenerator, MemoryStorage, MessageRole, SequentialIds, Storage,
        UuidGenerator,
    },
};

/// A message exchange waiting for its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    /// Conversation the user wrote in; the reply goes here
    pub conversation_id: String,
    pub prompt: String,
    /// How long to "think" before completing
    pub delay: Duration,
    /// Message count of the origin once the prompt was recorded
    pub expected_len: usize,
}

/// Application context, built once at startup and handed to the view
pub struct ChatApp {
    store: ConversationStore,
    responder: ResponseGenerator,
    delay: ThinkingDelay,
    exporter: Box<dyn ExportSink>,
}

impl ChatApp {
    pub fn new(
        store: ConversationStore,
        responder: ResponseGenerator,
        delay: ThinkingDelay,
        exporter: Box<dyn ExportSink>,
    ) -> Self {
        Self {
            store,
            responder,
            delay,
            exporter,
        }
    }

    /// Build the production wiring from configuration and load stored
    /// conversations. The receiver carries the store's events.
    pub fn from_config(
        config: &Config,
        ephemeral: bool,
    ) -> Result<(Self, mpsc::UnboundedReceiver<AppEvent>)> {
        debug!("Creating ChatApp");
        config.validate()?;

        // A seed makes the whole run reproducible, ids included
        let ids: Arc<dyn IdGenerator> = match config.seed {
            Some(_) => Arc::new(SequentialIds::new()),
            None => Arc::new(UuidGenerator),
        };

        let storage: Arc<dyn Storage> = if ephemeral {
            info!("Using in-memory storage");
            Arc::new(MemoryStorage::new())
        } else {
            Arc::new(FileStorage::new(&config.data_dir))
        };

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut store = ConversationStore::new(
            storage,
            ids,
            config.storage_key.clone(),
            event_tx,
        );
        store.load();

        let responder = ResponseGenerator::new(Box::new(RngSource::from_seed_option(config.seed)));
        let exporter = Box::new(DirectoryExport::new(&config.export_dir));

        Ok((
            Self::new(store, responder, config.thinking_delay(), exporter),
            event_rx,
        ))
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn is_busy(&self) -> bool {
        self.store.is_busy()
    }

    /// Record the user's message and start thinking. Returns `None` when the
    /// text is blank, a reply is already in flight, or nothing is active.
    pub fn begin_exchange(&mut self, text: &str) -> Option<PendingReply> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return None;
        }
        if self.store.is_busy() {
            debug!("Ignoring message while a reply is in flight");
            return None;
        }

        let conversation_id = self.store.active_id()?.to_string();
        if let Err(e) = self.store.append_message(MessageRole::User, prompt) {
            warn!("Could not record message: {}", e);
            return None;
        }
        let expected_len = self
            .store
            .get(&conversation_id)
            .map_or(0, |c| c.messages.len());

        self.store.set_busy(true);
        let delay = self.delay.sample(self.responder.random_mut());
        debug!("Thinking for {:?}", delay);

        Some(PendingReply {
            conversation_id,
            prompt: prompt.to_string(),
            delay,
            expected_len,
        })
    }

    /// Produce the reply for `pending` and append it to the conversation it
    /// came from. Returns `None` when that conversation was cleared while
    /// thinking; the reply is dropped.
    pub fn complete_exchange(&mut self, pending: PendingReply) -> Result<Option<String>> {
        let unchanged = self
            .store
            .get(&pending.conversation_id)
            .map_or(false, |c| c.messages.len() == pending.expected_len);
        if !unchanged {
            info!(
                "Conversation {} changed while thinking, dropping reply",
                pending.conversation_id
            );
            self.store.set_busy(false);
            return Ok(None);
        }

        let reply = self.responder.generate(&pending.prompt);
        let appended = self
            .store
            .append_message_to(&pending.conversation_id, MessageRole::Assistant, reply.clone());
        self.store.set_busy(false);

        appended?;
        Ok(Some(reply))
    }

    /// Full exchange for one-shot callers: record, wait, reply
    pub async fn send_message(&mut self, text: &str) -> Result<Option<String>> {
        let Some(pending) = self.begin_exchange(text) else {
            return Ok(None);
        };

        tokio::time::sleep(pending.delay).await;
        self.complete_exchange(pending)
    }

    pub fn new_conversation(&mut self) -> String {
        self.store.create_conversation()
    }

    pub fn select(&mut self, id: &str) -> bool {
        self.store.select_conversation(id)
    }

    /// Clear the active conversation if `confirm` agrees
    pub fn clear(&mut self, confirm: &dyn Confirm) -> Result<bool> {
        Ok(self.store.clear_active(confirm)?)
    }

    /// Export the active conversation through the configured sink
    pub fn export(&self) -> Result<PathBuf> {
        Ok(self.store.export_active(self.exporter.as_ref())?)
    }

    /// Apply a view command. Sends return the exchange the view must complete.
    pub fn dispatch(&mut self, command: ViewCommand) -> Option<PendingReply> {
        match command {
            ViewCommand::Submit(text) => self.begin_exchange(&text),
            ViewCommand::Suggestion(index) => match SUGGESTED_PROMPTS.get(index) {
                Some(prompt) => self.begin_exchange(prompt),
                None => None,
            },
            ViewCommand::NewConversation => {
                self.new_conversation();
                None
            }
            ViewCommand::Select(id) => {
                self.select(&id);
                None
            }
            ViewCommand::Clear { confirmed } => {
                if let Err(e) = self.clear(&DialogAnswer(confirmed)) {
                    warn!("Clear failed: {}", e);
                }
                None
            }
            ViewCommand::Export => {
                if let Err(e) = self.export() {
                    warn!("Export failed: {}", e);
                }
                None
            }
        }
    }
}
