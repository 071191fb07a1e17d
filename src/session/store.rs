//! The conversation store: single source of truth for all conversations

use std::{path::PathBuf, sync::Arc};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::{AppEvent, Confirm, ExportSink};

use super::{
    conversation::{Conversation, Message, MessageRole},
    errors::{StoreError, StoreResult},
    ids::IdGenerator,
    storage::Storage,
    transcript,
};

const CLEAR_PROMPT: &str = "Clear the current conversation?";

/// Owns every conversation, the active selection and the busy flag.
///
/// Every mutation is persisted as a whole-state overwrite and announced on the
/// event channel. Persistence failures are logged and otherwise ignored: the
/// in-memory state stays authoritative and the next mutation retries.
pub struct ConversationStore {
    storage: Arc<dyn Storage>,
    ids: Arc<dyn IdGenerator>,
    storage_key: String,
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    busy: bool,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ConversationStore {
    /// Create an empty store; call [`ConversationStore::load`] before use
    pub fn new(
        storage: Arc<dyn Storage>,
        ids: Arc<dyn IdGenerator>,
        storage_key: impl Into<String>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            storage,
            ids,
            storage_key: storage_key.into(),
            conversations: Vec::new(),
            active_id: None,
            busy: false,
            event_tx,
        }
    }

    /// Rehydrate from storage. Missing or corrupt data yields an empty list,
    /// and an empty list gets one fresh conversation.
    pub fn load(&mut self) {
        self.conversations = match self.read_persisted() {
            Ok(conversations) => conversations,
            Err(e) => {
                warn!("{}; starting with no conversations", e);
                Vec::new()
            }
        };
        info!("Loaded {} conversations", self.conversations.len());

        if self.conversations.is_empty() {
            self.create_conversation();
            return;
        }

        let first = self.conversations[0].id.clone();
        self.select_conversation(&first);
    }

    fn read_persisted(&self) -> StoreResult<Vec<Conversation>> {
        let Some(raw) = self.storage.get(&self.storage_key)? else {
            return Ok(Vec::new());
        };

        let mut conversations: Vec<Conversation> = serde_json::from_str(&raw)
            .map_err(|e| StoreError::PersistenceRead(format!("malformed data: {}", e)))?;

        // Keep the first occurrence of any duplicated id
        let mut seen = std::collections::HashSet::new();
        conversations.retain(|c| seen.insert(c.id.clone()));

        Ok(conversations)
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.conversations)
            .map_err(StoreError::from)
            .and_then(|json| self.storage.set(&self.storage_key, &json));

        if let Err(e) = result {
            warn!("{}; keeping in-memory state", e);
        }
    }

    fn emit(&self, event: AppEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No view listening for store events");
        }
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = self.ids.next_id();
            if self.get(&id).is_none() {
                return id;
            }
            warn!("Id generator produced a duplicate id {}, retrying", id);
        }
    }

    /// Start a new, empty conversation at the top of the list and make it active
    pub fn create_conversation(&mut self) -> String {
        let conversation = Conversation::new(self.fresh_id());
        let id = conversation.id.clone();
        debug!("Creating conversation {}", id);

        self.conversations.insert(0, conversation);
        self.persist();
        self.active_id = Some(id.clone());

        self.emit(AppEvent::ConversationsChanged);
        self.emit(AppEvent::ActiveConversationChanged {
            conversation_id: id.clone(),
        });
        id
    }

    /// Make `id` the active conversation. Unknown ids are ignored.
    pub fn select_conversation(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            debug!("Ignoring selection of unknown conversation {}", id);
            return false;
        }

        self.active_id = Some(id.to_string());
        self.emit(AppEvent::ActiveConversationChanged {
            conversation_id: id.to_string(),
        });
        true
    }

    /// Append to the active conversation
    pub fn append_message(&mut self, role: MessageRole, content: impl Into<String>) -> StoreResult<()> {
        let id = self.active_id.clone().ok_or(StoreError::NoActiveConversation)?;
        self.append_message_to(&id, role, content)
    }

    /// Append to a specific conversation, fixing its title when this completes
    /// the first exchange
    pub fn append_message_to(
        &mut self,
        id: &str,
        role: MessageRole,
        content: impl Into<String>,
    ) -> StoreResult<()> {
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::UnknownConversation(id.to_string()))?;

        let title_changed = conversation.push(Message::new(role, content));
        let title = conversation.title.clone();
        self.persist();

        self.emit(AppEvent::MessageAppended {
            conversation_id: id.to_string(),
            role,
        });
        if title_changed {
            debug!("Conversation {} titled {:?}", id, title);
            self.emit(AppEvent::TitleChanged {
                conversation_id: id.to_string(),
                title,
            });
            self.emit(AppEvent::ConversationsChanged);
        }
        Ok(())
    }

    /// Empty the active conversation after the user confirms.
    /// Returns `false` when the user declined.
    pub fn clear_active(&mut self, confirm: &dyn Confirm) -> StoreResult<bool> {
        if !confirm.confirm(CLEAR_PROMPT) {
            return Ok(false);
        }

        let id = self.active_id.clone().ok_or(StoreError::NoActiveConversation)?;
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NoActiveConversation)?;

        conversation.clear();
        self.persist();
        info!("Cleared conversation {}", id);

        self.emit(AppEvent::ConversationCleared { conversation_id: id });
        self.emit(AppEvent::ConversationsChanged);
        Ok(true)
    }

    /// File name and transcript of the active conversation
    pub fn transcript_active(&self) -> StoreResult<(String, String)> {
        let conversation = self.active().ok_or(StoreError::NoActiveConversation)?;
        let text = transcript::render(conversation)?;
        Ok((transcript::export_filename(conversation), text))
    }

    /// Hand the active conversation's transcript to `sink`
    pub fn export_active(&self, sink: &dyn ExportSink) -> StoreResult<PathBuf> {
        let result = self.transcript_active().and_then(|(filename, text)| {
            sink.save(&filename, text.as_bytes())
                .map_err(|e| StoreError::Export(format!("{:#}", e)))
        });

        match &result {
            Ok(path) => self.emit(AppEvent::Exported { path: path.clone() }),
            Err(e) => self.emit(AppEvent::Error { error: e.to_string() }),
        }
        result
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        if self.busy != busy {
            self.busy = busy;
            self.emit(AppEvent::BusyChanged { busy });
        }
    }

    /// All conversations, most recent first
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStorage, SequentialIds, DEFAULT_TITLE};
    use std::sync::Mutex;

    const KEY: &str = "zed_conversations";

    fn store_with(storage: Arc<dyn Storage>) -> (ConversationStore, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = ConversationStore::new(storage, Arc::new(SequentialIds::new()), KEY, tx);
        (store, rx)
    }

    fn loaded_store() -> (ConversationStore, Arc<MemoryStorage>, mpsc::UnboundedReceiver<AppEvent>) {
        let storage = Arc::new(MemoryStorage::new());
        let (mut store, rx) = store_with(storage.clone());
        store.load();
        (store, storage, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl ExportSink for RecordingSink {
        fn save(&self, filename: &str, payload: &[u8]) -> anyhow::Result<PathBuf> {
            self.saved.lock().unwrap().push((filename.to_string(), payload.to_vec()));
            Ok(PathBuf::from(filename))
        }
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::PersistenceRead("disk on fire".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::PersistenceWrite("quota exceeded".into()))
        }
    }

    #[test]
    fn test_first_launch_creates_default_conversation() {
        let (store, storage, _rx) = loaded_store();

        assert_eq!(store.conversations().len(), 1);
        let active = store.active().unwrap();
        assert_eq!(active.title, DEFAULT_TITLE);
        assert!(active.is_empty());
        assert!(storage.get(KEY).unwrap().is_some());
    }

    #[test]
    fn test_malformed_data_loads_as_fresh_state() {
        let storage = Arc::new(MemoryStorage::new().with_entry(KEY, "{not json"));
        let (mut store, _rx) = store_with(storage);
        store.load();

        assert_eq!(store.conversations().len(), 1);
        assert_eq!(store.active_id(), Some(store.conversations()[0].id.as_str()));
    }

    #[test]
    fn test_read_failure_falls_back_to_memory() {
        let (mut store, _rx) = store_with(Arc::new(FailingStorage));
        store.load();
        store.append_message(MessageRole::User, "still works").unwrap();

        assert_eq!(store.active().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_create_prepends_with_unique_ids() {
        let (mut store, _storage, _rx) = loaded_store();
        let mut created = Vec::new();
        for _ in 0..5 {
            created.push(store.create_conversation());
        }

        let ids: Vec<&str> = store.conversations().iter().map(|c| c.id.as_str()).collect();
        let expected: Vec<&str> = created.iter().rev().map(String::as_str).collect();
        assert_eq!(&ids[..5], &expected[..]);

        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(store.active_id(), Some(created[4].as_str()));
    }

    #[test]
    fn test_create_emits_list_and_active_events() {
        let (mut store, _storage, mut rx) = loaded_store();
        drain(&mut rx);

        let id = store.create_conversation();
        assert_eq!(
            drain(&mut rx),
            vec![
                AppEvent::ConversationsChanged,
                AppEvent::ActiveConversationChanged { conversation_id: id },
            ]
        );
    }

    #[test]
    fn test_fresh_id_skips_ids_already_loaded() {
        let mut existing = Conversation::new("conv-1".to_string());
        existing.title = "kept".to_string();
        let json = serde_json::to_string(&vec![existing]).unwrap();

        let storage = Arc::new(MemoryStorage::new().with_entry(KEY, &json));
        let (mut store, _rx) = store_with(storage);
        store.load();

        assert_eq!(store.create_conversation(), "conv-2");
    }

    #[test]
    fn test_roundtrip_through_storage() {
        let (mut store, storage, _rx) = loaded_store();
        store.append_message(MessageRole::User, "hello").unwrap();
        store.append_message(MessageRole::Assistant, "hi").unwrap();
        store.create_conversation();
        store.append_message(MessageRole::User, "second").unwrap();

        let (mut reloaded, _rx2) = store_with(storage);
        reloaded.load();

        assert_eq!(reloaded.conversations(), store.conversations());
        assert_eq!(reloaded.active_id(), Some(store.conversations()[0].id.as_str()));
    }

    #[test]
    fn test_select_unknown_is_noop() {
        let (mut store, _storage, mut rx) = loaded_store();
        let before = store.active_id().map(str::to_string);
        drain(&mut rx);

        assert!(!store.select_conversation("missing"));
        assert_eq!(store.active_id().map(str::to_string), before);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_select_is_idempotent() {
        let (mut store, _storage, _rx) = loaded_store();
        let first = store.conversations()[0].id.clone();
        store.create_conversation();

        store.select_conversation(&first);
        let once = (store.active_id().map(str::to_string), store.conversations().to_vec());
        store.select_conversation(&first);
        let twice = (store.active_id().map(str::to_string), store.conversations().to_vec());

        assert_eq!(once, twice);
        assert_eq!(once.0.as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_first_exchange_sets_title() {
        let (mut store, _storage, mut rx) = loaded_store();
        let id = store.active_id().unwrap().to_string();
        drain(&mut rx);

        store
            .append_message(MessageRole::User, "Hello there, how are you today friend")
            .unwrap();
        store.append_message(MessageRole::Assistant, "Hi!").unwrap();

        assert_eq!(store.active().unwrap().title, "Hello there, how are...");
        assert!(drain(&mut rx).contains(&AppEvent::TitleChanged {
            conversation_id: id,
            title: "Hello there, how are...".to_string(),
        }));
    }

    #[test]
    fn test_append_to_keeps_other_conversation_active() {
        let (mut store, _storage, _rx) = loaded_store();
        let first = store.active_id().unwrap().to_string();
        store.append_message(MessageRole::User, "question").unwrap();
        let second = store.create_conversation();

        store.append_message_to(&first, MessageRole::Assistant, "answer").unwrap();

        assert_eq!(store.active_id(), Some(second.as_str()));
        assert_eq!(store.get(&first).unwrap().messages.len(), 2);
        assert_eq!(store.get(&first).unwrap().title, "question");
        assert!(store.get(&second).unwrap().is_empty());
    }

    #[test]
    fn test_append_to_unknown_conversation_fails() {
        let (mut store, _storage, _rx) = loaded_store();
        let err = store.append_message_to("nope", MessageRole::User, "x").unwrap_err();
        assert!(matches!(err, StoreError::UnknownConversation(_)));
    }

    #[test]
    fn test_append_without_active_conversation() {
        let (mut store, _rx) = store_with(Arc::new(MemoryStorage::new()));
        let err = store.append_message(MessageRole::User, "x").unwrap_err();
        assert!(matches!(err, StoreError::NoActiveConversation));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let (mut store, _storage, _rx) = loaded_store();
        store.append_message(MessageRole::User, "keep me").unwrap();

        let declined = store.clear_active(&|_: &str| false).unwrap();
        assert!(!declined);
        assert_eq!(store.active().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_clear_only_touches_active_conversation() {
        let (mut store, storage, _rx) = loaded_store();
        let other = store.active_id().unwrap().to_string();
        store.append_message(MessageRole::User, "other chat").unwrap();
        store.append_message(MessageRole::Assistant, "reply").unwrap();

        store.create_conversation();
        store.append_message(MessageRole::User, "to be cleared").unwrap();
        store.append_message(MessageRole::Assistant, "reply").unwrap();

        assert!(store.clear_active(&|_: &str| true).unwrap());

        let active = store.active().unwrap();
        assert!(active.is_empty());
        assert_eq!(active.title, DEFAULT_TITLE);

        let untouched = store.get(&other).unwrap();
        assert_eq!(untouched.messages.len(), 2);
        assert_eq!(untouched.title, "other chat");

        let persisted: Vec<Conversation> =
            serde_json::from_str(&storage.get(KEY).unwrap().unwrap()).unwrap();
        assert!(persisted[0].is_empty());
    }

    #[test]
    fn test_export_empty_conversation_fails_without_download() {
        let (store, _storage, mut rx) = loaded_store();
        drain(&mut rx);
        let sink = RecordingSink::default();

        let err = store.export_active(&sink).unwrap_err();
        assert!(matches!(err, StoreError::EmptyConversation));
        assert!(sink.saved.lock().unwrap().is_empty());
        assert!(drain(&mut rx).iter().any(AppEvent::is_error));
    }

    #[test]
    fn test_export_hands_transcript_to_sink() {
        let (mut store, _storage, _rx) = loaded_store();
        store.append_message(MessageRole::User, "hello").unwrap();
        let id = store.active_id().unwrap().to_string();
        let sink = RecordingSink::default();

        let path = store.export_active(&sink).unwrap();
        assert_eq!(path, PathBuf::from(format!("zed-ai-chat-{}.txt", id)));

        let saved = sink.saved.lock().unwrap();
        let text = String::from_utf8(saved[0].1.clone()).unwrap();
        assert!(text.starts_with("Zed AI conversation export\n"));
        assert!(text.contains("User: hello"));
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let (mut store, _rx) = store_with(Arc::new(FailingStorage));
        store.load();
        store.append_message(MessageRole::User, "a").unwrap();
        store.append_message(MessageRole::Assistant, "b").unwrap();

        assert_eq!(store.active().unwrap().messages.len(), 2);
        assert_eq!(store.active().unwrap().title, "a");
    }

    #[test]
    fn test_busy_flag_emits_only_on_change() {
        let (mut store, _storage, mut rx) = loaded_store();
        drain(&mut rx);

        store.set_busy(true);
        store.set_busy(true);
        store.set_busy(false);

        assert_eq!(
            drain(&mut rx),
            vec![
                AppEvent::BusyChanged { busy: true },
                AppEvent::BusyChanged { busy: false },
            ]
        );
        assert!(!store.is_busy());
    }
}
