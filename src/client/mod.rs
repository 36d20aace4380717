use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::errors::MindSparkError;
use crate::normalize;
use crate::render::{Answer, QuizBoard};
use crate::state::{SessionStore, StateStorage, CORRECT_ANSWER_XP};
use crate::wire::{ErrorBody, ErrorResult, GenerationRequest, GenerationResult, HealthBody, Mode, Outcome};

pub const EMPTY_INPUT: &str = "Please enter some text or upload a note first!";
pub const TRANSPORT_FAILURE: &str = "Could not reach the MindSpark server.";

/// Trimmed text, or a validation error when nothing is left.
pub fn validate_text(text: &str) -> crate::errors::Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MindSparkError::Validation(EMPTY_INPUT.to_string()));
    }
    Ok(trimmed)
}

/// Message shown in the error panel for a failed request.
fn display_message(err: &MindSparkError) -> String {
    match err {
        MindSparkError::Upstream(msg) => msg.clone(),
        MindSparkError::Transport(_) => TRANSPORT_FAILURE.to_string(),
        MindSparkError::Parse(_) => "The server sent a response MindSpark could not read.".to_string(),
        other => other.to_string(),
    }
}

/// HTTP client for the generation proxy.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    http: Client,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url: base_url.into(), http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Blank text fails fast without touching the network. Everything after
    /// that settles into an [`Outcome`].
    pub async fn generate(&self, text: &str, mode: Mode) -> crate::errors::Result<Outcome> {
        let text = validate_text(text)?;
        Ok(match self.request(text, mode).await {
            Ok(result) => Outcome::Ready(result),
            Err(e) => {
                tracing::warn!(%mode, error = %e, "generation request failed");
                Outcome::Failed(ErrorResult { message: display_message(&e) })
            }
        })
    }

    async fn request(&self, text: &str, mode: Mode) -> crate::errors::Result<GenerationResult> {
        let url = self.url(mode.endpoint());
        tracing::debug!(%url, chars = text.chars().count(), "posting to proxy");

        let resp = self
            .http
            .post(&url)
            .json(&GenerationRequest { text: text.to_string() })
            .send()
            .await
            .map_err(|e| MindSparkError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| MindSparkError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("API error: {}", status.as_u16()));
            return Err(MindSparkError::Upstream(message));
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| MindSparkError::Parse(format!("response is not JSON: {e}")))?;
        let result = GenerationResult::from_value(mode, value)?;
        normalize::validate_result(&result)?;
        Ok(result)
    }

    pub async fn health(&self) -> crate::errors::Result<HealthBody> {
        let resp = self
            .http
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| MindSparkError::Transport(e.to_string()))?;
        resp.json::<HealthBody>()
            .await
            .map_err(|e| MindSparkError::Parse(e.to_string()))
    }
}

/// Shown for the lifetime of one outstanding request.
pub trait Loading {
    fn start(&mut self, mode: Mode);
    fn finish(&mut self);
}

pub struct NoLoading;

impl Loading for NoLoading {
    fn start(&mut self, _mode: Mode) {}
    fn finish(&mut self) {}
}

/// Client-side glue between the proxy, the session store and the loader.
pub struct StudySession<S: StateStorage> {
    client: ProxyClient,
    store: SessionStore<S>,
}

impl<S: StateStorage> StudySession<S> {
    pub fn new(client: ProxyClient, store: SessionStore<S>) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &ProxyClient {
        &self.client
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.store
    }

    /// Generate content for `mode`. A success counts as one created item.
    pub async fn generate(
        &mut self,
        text: &str,
        mode: Mode,
        loading: &mut dyn Loading,
    ) -> crate::errors::Result<Outcome> {
        let text = validate_text(text)?;

        loading.start(mode);
        let outcome = self.client.generate(text, mode).await;
        loading.finish();

        let outcome = outcome?;
        if matches!(outcome, Outcome::Ready(_)) {
            self.store.record_creation();
        }
        Ok(outcome)
    }

    /// Answer a quiz question; a correct first answer is worth bonus XP.
    pub fn answer(&mut self, board: &mut QuizBoard, question: usize, option: usize) -> Option<Answer> {
        let answer = board.select(question, option, |_| {})?;
        if answer.correct {
            self.store.award(CORRECT_ANSWER_XP);
        }
        Some(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_text_is_rejected() {
        assert!(matches!(validate_text(" \n\t "), Err(MindSparkError::Validation(_))));
        assert_eq!(validate_text("  notes \n").unwrap(), "notes");
    }

    #[test]
    fn upstream_message_is_shown_verbatim() {
        let e = MindSparkError::Upstream("Failed to generate quiz. Check your API key.".into());
        assert_eq!(display_message(&e), "Failed to generate quiz. Check your API key.");
        assert_eq!(display_message(&MindSparkError::Transport("refused".into())), TRANSPORT_FAILURE);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let c = ProxyClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(c.url(Mode::Summary.endpoint()), "http://localhost:3000/api/summarize");
    }
}
