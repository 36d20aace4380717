use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ProviderKind};
use crate::prompt::Prompt;

pub mod openai;
pub mod anthropic;
pub mod ollama;

/// External language-model API: takes a prompt, returns generated text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String>;

    fn name(&self) -> &'static str;
}

pub type DynProvider = Arc<dyn CompletionService>;

pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    match cfg.provider {
        ProviderKind::OpenAI => Ok(Arc::new(openai::OpenAIProvider::new(
            cfg.model.clone(),
            cfg.openai_base.clone(),
            timeout,
        )?)),
        ProviderKind::Anthropic => Ok(Arc::new(anthropic::Anthropic::new(
            cfg.model.clone(),
            cfg.anthropic_base.clone(),
            timeout,
        )?)),
        ProviderKind::Ollama => Ok(Arc::new(ollama::Ollama::new(
            cfg.model.clone(),
            cfg.ollama_url.clone(),
            timeout,
        )?)),
    }
}
