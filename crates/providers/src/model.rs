use async_trait::async_trait;

/// Typed chat message for the completion request.
///
/// A role and its text, nothing more; [`to_openai_value`] turns it
/// into the wire shape the Chat Completions endpoint expects.
///
/// [`to_openai_value`]: ChatMessage::to_openai_value
#[derive(Debug, Clone)]
pub enum ChatMessage {
    System { content: String },
    User { content: String },
    Assistant { content: String },
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
        }
    }

    /// Convert to OpenAI-compatible JSON format.
    #[must_use]
    pub fn to_openai_value(&self) -> serde_json::Value {
        let (role, content) = match self {
            Self::System { content } => ("system", content),
            Self::User { content } => ("user", content),
            Self::Assistant { content } => ("assistant", content),
        };
        serde_json::json!({ "role": role, "content": content })
    }
}

/// Generates the assistant's reply to one inbound message.
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Produce a completion for the given conversation context. An
    /// empty completion is an error, never an empty reply.
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String>;
}

/// Fixed-reply provider for tests and keyless setups.
pub struct StaticReplyProvider {
    reply: String,
}

impl StaticReplyProvider {
    #[must_use]
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ReplyProvider for StaticReplyProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
        Ok(self.reply.clone())
    }
}
