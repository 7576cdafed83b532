//! Conversation persistence.
//!
//! Every inbound message opens a [`Thread`](conversations::Thread)
//! under the sender's [`Identity`](conversations::Identity); the reply
//! segments are appended to the same thread in send order. The
//! [`ConversationStore`](conversations::ConversationStore) trait keeps
//! callers decoupled from SQLite so tests can substitute their own
//! implementation.

pub mod conversations;
pub mod error;
pub mod sqlite;

pub use {
    conversations::{ConversationStore, Direction, Identity, MessageRecord, Thread},
    error::{Error, Result},
    sqlite::SqliteConversationStore,
};
