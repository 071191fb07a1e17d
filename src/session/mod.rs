//! Conversation state and persistence
//!
//! This module provides the conversation model, the store that owns all
//! conversations, and the storage backends the store persists through.

mod conversation;
mod errors;
mod ids;
mod storage;
mod store;
pub mod transcript;

pub use conversation::*;
pub use errors::*;
pub use ids::*;
pub use storage::*;
pub use store::*;
