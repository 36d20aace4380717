use async_trait::async_trait;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::prompt::Prompt;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// OpenAI chat-completions adapter. The key is read from the environment on
/// every call, so a server started without one still answers with a 500.
pub struct OpenAIProvider {
    model: String,
    api_base: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(model: String, api_base: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { model, api_base, client })
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl super::CompletionService for OpenAIProvider {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| anyhow!("{API_KEY_VAR} env var is not set"))?;

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user }
            ],
            "temperature": prompt.temperature,
            "max_tokens": prompt.max_tokens
        });

        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        tracing::debug!(%url, body = %body, "openai request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("openai read body failed")?;
        tracing::debug!(%status, raw = %text, "openai response");

        if !status.is_success() {
            return Err(anyhow!("OpenAI API error ({}): {}", status, text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse OpenAI response: {e}\nRaw: {text}"))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("openai: response carried no message content"))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
