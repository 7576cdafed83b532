//! LLM completion providers.
//!
//! [`ReplyProvider`] is the single seam the webhook depends on.
//! [`OpenAiProvider`] speaks the Chat Completions API;
//! [`StaticReplyProvider`] answers with a fixed line for tests and
//! keyless setups.

pub mod model;
pub mod openai;

pub use {
    model::{ChatMessage, ReplyProvider, StaticReplyProvider},
    openai::OpenAiProvider,
};
