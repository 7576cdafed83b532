use {async_trait::async_trait, serde::Serialize};

use crate::error::{Error, Result};

/// A stable correspondent, keyed by the opaque sender token the
/// messaging provider reports (for SMS, the E.164 phone number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub token: String,
    pub created_at: i64,
}

/// One webhook exchange: the inbound message plus every reply segment
/// sent back for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    pub id: String,
    pub identity_id: String,
    /// Provider-assigned id of the inbound message, when one was given.
    pub provider_sid: Option<String>,
    pub started_at: i64,
    pub ended_at: Option<i64>,
}

/// Who produced a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
    System,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "inbound" => Ok(Self::Inbound),
            "outbound" => Ok(Self::Outbound),
            "system" => Ok(Self::System),
            other => Err(Error::invalid_direction(other)),
        }
    }
}

/// One stored message. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub id: i64,
    pub thread_id: String,
    pub provider_sid: Option<String>,
    pub direction: Direction,
    pub body: String,
    pub sent_at: i64,
}

/// Persistent record of webhook conversations.
///
/// The webhook treats every method as best-effort telemetry: a failure
/// is logged by the caller and never changes the reply.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Look up the identity for `token`, creating it on first contact.
    async fn ensure_identity(&self, token: &str) -> Result<Identity>;

    /// Open a fresh thread under an identity.
    async fn open_thread(&self, identity_id: &str, provider_sid: Option<&str>) -> Result<Thread>;

    /// Append one message to a thread. `sent_at` is supplied by the
    /// caller and fixes the replay order.
    async fn append_message(
        &self,
        thread_id: &str,
        provider_sid: Option<&str>,
        direction: Direction,
        body: &str,
        sent_at: i64,
    ) -> Result<MessageRecord>;

    /// Mark a thread finished.
    async fn close_thread(&self, thread_id: &str, ended_at: i64) -> Result<()>;

    /// Every known identity, oldest first.
    async fn list_identities(&self) -> Result<Vec<Identity>>;

    /// Threads under one identity, oldest first.
    async fn list_threads(&self, identity_id: &str) -> Result<Vec<Thread>>;

    /// Messages in one thread, ordered by `sent_at`, then insertion.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<MessageRecord>>;
}
