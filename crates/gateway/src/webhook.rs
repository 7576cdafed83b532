//! The inbound-message webhook.
//!
//! One handler does the whole exchange. It records the inbound message,
//! generates a reply, then answers with the split and paced reply as a
//! TwiML document, recording the outbound rows on the way out.
//! Persistence never changes the response.

use {
    axum::{
        extract::{Form, State},
        http::header,
        response::IntoResponse,
    },
    serde::Deserialize,
    tracing::{debug, info, warn},
};

use {
    remora_providers::ChatMessage,
    remora_reply::{plan_with, schedule},
};

use crate::state::AppState;

/// Message text used when the form carries no usable `Body`.
const DEFAULT_BODY: &str = "Hello?";
/// Sender token used when the form carries no usable `From`.
const DEFAULT_FROM: &str = "Unknown";

/// The form fields this gateway reads. Providers post many more;
/// everything unknown is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TwilioForm {
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
}

impl TwilioForm {
    /// Message text, defaulted when the field is missing or empty.
    fn message_body(&self) -> &str {
        match self.body.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => DEFAULT_BODY,
        }
    }

    /// Sender token, defaulted when the field is missing or empty.
    fn sender(&self) -> &str {
        match self.from.as_deref() {
            Some(token) if !token.is_empty() => token,
            _ => DEFAULT_FROM,
        }
    }
}

/// `POST /webhooks/twilio`
pub async fn twilio_webhook(
    State(state): State<AppState>,
    Form(form): Form<TwilioForm>,
) -> impl IntoResponse {
    let body = form.message_body();
    let from = form.sender();
    debug!(from, sid = ?form.message_sid, "inbound message");

    let handle = state
        .recorder
        .record_inbound(from, form.message_sid.as_deref(), body)
        .await;

    let reply = generate_reply(&state, body).await;

    let segments = plan_with(&reply, &state.settings.plan);
    if segments.is_empty() {
        // A non-empty reply must never plan to nothing; answer with a
        // bare fallback envelope rather than silence.
        warn!(from, "reply produced no deliverable segments");
        return (
            [(header::CONTENT_TYPE, remora_twiml::CONTENT_TYPE)],
            remora_twiml::render_single(&state.settings.fallback_reply),
        );
    }

    let plan = schedule(segments, &state.settings.pacing);
    let xml = remora_twiml::render(&plan);

    if let Some(handle) = handle {
        state.recorder.record_outbound(handle, &plan).await;
    }

    info!(from, parts = plan.segments().count(), "reply dispatched");
    ([(header::CONTENT_TYPE, remora_twiml::CONTENT_TYPE)], xml)
}

/// Run the provider over the configured system prompt plus the inbound
/// message. Any failure degrades to the fixed fallback reply.
async fn generate_reply(state: &AppState, body: &str) -> String {
    let context = [
        ChatMessage::system(&state.settings.system_prompt),
        ChatMessage::user(body),
    ];
    match state.provider.complete(&context).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(provider = state.provider.name(), "completion failed: {e}");
            state.settings.fallback_reply.clone()
        },
    }
}
