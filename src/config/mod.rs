use anyhow::{Context, Result};
use clap::ValueEnum;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "open-ai", alias = "openai")]
    OpenAI,
    #[value(alias = "anthropic")]
    Anthropic,
    #[value(alias = "ollama")]
    Ollama,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <ProviderKind as ValueEnum>::from_str(s, true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Proxy bind host.
    pub host: String,
    /// Proxy bind port.
    pub port: u16,
    pub provider: ProviderKind,
    pub model: String,
    pub timeout_secs: u64,
    pub openai_base: String,
    pub anthropic_base: String,
    pub ollama_url: String,
    /// Base URL the client talks to.
    pub server_url: String,
    /// Where the client keeps its session blob.
    pub state_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            provider: ProviderKind::OpenAI,
            model: "gpt-3.5-turbo".into(),
            timeout_secs: 60,
            openai_base: "https://api.openai.com".into(),
            anthropic_base: "https://api.anthropic.com".into(),
            ollama_url: "http://localhost:11434".into(),
            server_url: "http://localhost:3000".into(),
            state_path: ".mindspark/state.json".into(),
        }
    }
}

impl Config {
    /// Defaults, then the optional TOML file, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                let raw = fs::read_to_string(p)?;
                Self::from_toml_str(&raw).with_context(|| format!("invalid config {}", p.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().with_context(|| format!("PORT is not a port number: {port}"))?;
        }
        if let Some(url) = lookup("MINDSPARK_SERVER") {
            self.server_url = url;
        }
        if let Some(model) = lookup("MINDSPARK_MODEL") {
            self.model = model;
        }
        if let Some(kind) = lookup("MINDSPARK_PROVIDER") {
            self.provider = kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("MINDSPARK_PROVIDER: {e}"))?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml_str("port = 8080\nprovider = \"ollama\"\n").unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.provider, ProviderKind::Ollama);
        assert_eq!(cfg.server_url, "http://localhost:3000");
        assert_eq!(cfg.model, "gpt-3.5-turbo");
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [("PORT", "4000"), ("MINDSPARK_SERVER", "http://10.0.0.2:4000")]
            .into_iter()
            .collect();
        let mut cfg = Config::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:4000");
        assert_eq!(cfg.server_url, "http://10.0.0.2:4000");
    }

    #[test]
    fn bad_port_is_reported() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(|k| (k == "PORT").then(|| "eighty".to_string()));
        assert!(err.is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mindspark.toml");
        fs::write(&path, "model = \"llama3\"\nprovider = \"ollama\"\n").unwrap();
        let cfg = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(cfg.provider, ProviderKind::Ollama);
    }
}
