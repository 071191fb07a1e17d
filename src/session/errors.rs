//! Error types for conversation storage

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read persisted conversations: {0}")]
    PersistenceRead(String),

    #[error("Failed to persist conversations: {0}")]
    PersistenceWrite(String),

    #[error("The current conversation is empty, nothing to export")]
    EmptyConversation,

    #[error("No active conversation")]
    NoActiveConversation,

    #[error("Unknown conversation: {0}")]
    UnknownConversation(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
