use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use crate::loader::data_dir;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant answering text messages. \
     Keep replies short, friendly, and conversational.";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoraConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub assistant: AssistantConfig,
    pub reply: ReplyConfig,
    pub storage: StorageConfig,
}

/// Webhook server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on. Defaults to 3000.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// Completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of a Chat Completions compatible API.
    pub base_url: String,
    /// API key. Usually set as `api_key = "${OPENAI_API_KEY}"`.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<Secret<String>>,
    /// Model to request. Defaults to "gpt-4o".
    pub model: String,
    /// Request timeout in seconds. Defaults to 30.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
            model: "gpt-4o".into(),
            timeout_secs: 30,
        }
    }
}

/// Assistant persona and fallback copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// System prompt injected before the inbound message.
    pub system_prompt: String,
    /// Reply sent when no completion could be produced.
    pub fallback_reply: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            fallback_reply: "Sorry, I could not generate a response.".into(),
        }
    }
}

/// Segmentation and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Segment length ceiling in bytes. Defaults to 1500.
    pub max_segment_len: usize,
    /// Shrink split bodies so numbered segments stay under the ceiling.
    /// Off by default; the "(i/N) " prefix then rides on top.
    pub reserve_prefix_width: bool,
    /// Body of the filler message that opens a multi-part reply.
    pub filler_text: String,
    /// Pause in seconds between the filler and the first real segment.
    pub filler_delay_secs: u64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            max_segment_len: 1500,
            reserve_prefix_width: false,
            filler_text: "...".into(),
            filler_delay_secs: 2,
        }
    }
}

/// Conversation store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path. Defaults to `remora.db` under the platform
    /// data directory.
    pub database_path: Option<PathBuf>,
}

impl StorageConfig {
    /// The configured path, or the platform default.
    #[must_use]
    pub fn resolve_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir().join("remora.db"))
    }
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret.as_ref().map(ExposeSecret::expose_secret) {
        Some(key) => serializer.serialize_some(key),
        None => serializer.serialize_none(),
    }
}
