use std::time::Duration;

use {
    async_trait::async_trait,
    secrecy::ExposeSecret,
    tracing::{debug, trace, warn},
};

use crate::model::{ChatMessage, ReplyProvider};

/// Provider speaking the OpenAI Chat Completions API.
///
/// Owns its HTTP client; nothing here is process-global, so tests can
/// point separate instances at separate servers.
pub struct OpenAiProvider {
    api_key: secrecy::Secret<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        api_key: secrecy::Secret<String>,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            model,
            base_url,
            client,
        })
    }
}

#[async_trait]
impl ReplyProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages
                .iter()
                .map(ChatMessage::to_openai_value)
                .collect::<Vec<_>>(),
        });

        debug!(
            model = %self.model,
            messages_count = messages.len(),
            "chat completion request"
        );
        trace!(body = %body, "chat completion request body");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                model = %self.model,
                body = %body_text,
                "chat completion API error"
            );
            anyhow::bail!("chat completion API error HTTP {status}: {body_text}");
        }

        let payload = response.json::<serde_json::Value>().await?;
        trace!(response = %payload, "chat completion raw response");

        let Some(text) = payload["choices"][0]["message"]["content"].as_str() else {
            anyhow::bail!("malformed completion response: choices[0].message.content missing");
        };

        if text.trim().is_empty() {
            anyhow::bail!("provider returned an empty completion");
        }
        Ok(text.to_string())
    }
}
