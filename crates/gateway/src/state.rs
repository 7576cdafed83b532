use std::sync::Arc;

use {
    remora_config::RemoraConfig,
    remora_providers::ReplyProvider,
    remora_reply::{PacingConfig, PlanOptions},
    remora_store::ConversationStore,
};

use crate::recorder::Recorder;

/// Shared handler state. Cloning is cheap; everything heavy sits behind
/// an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Generates the reply text for each inbound message.
    pub provider: Arc<dyn ReplyProvider>,
    /// Direct store access for the admin read side.
    pub store: Arc<dyn ConversationStore>,
    /// Best-effort persistence used by the webhook path.
    pub recorder: Recorder,
    pub settings: Arc<ReplySettings>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn ReplyProvider>,
        store: Arc<dyn ConversationStore>,
        settings: ReplySettings,
    ) -> Self {
        let recorder = Recorder::new(Arc::clone(&store));
        Self {
            provider,
            store,
            recorder,
            settings: Arc::new(settings),
        }
    }
}

/// Request-independent knobs the webhook consults on every call.
#[derive(Debug, Clone)]
pub struct ReplySettings {
    /// System instruction sent ahead of every user message.
    pub system_prompt: String,
    /// Reply used when generation fails or returns nothing.
    pub fallback_reply: String,
    pub plan: PlanOptions,
    pub pacing: PacingConfig,
}

impl ReplySettings {
    pub fn from_config(config: &RemoraConfig) -> Self {
        Self {
            system_prompt: config.assistant.system_prompt.clone(),
            fallback_reply: config.assistant.fallback_reply.clone(),
            plan: PlanOptions {
                max_len: config.reply.max_segment_len,
                reserve_prefix_width: config.reply.reserve_prefix_width,
            },
            pacing: PacingConfig {
                filler_text: config.reply.filler_text.clone(),
                filler_delay_secs: config.reply.filler_delay_secs,
            },
        }
    }
}
