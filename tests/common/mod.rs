#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mindspark::prompt::Prompt;
use mindspark::provider::{CompletionService, DynProvider};
use mindspark::server::{self, AppState};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Completion service that replays a fixed reply and records prompts.
pub struct Scripted {
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Prompt>>,
}

impl Scripted {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { reply: Some(reply.into()), calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { reply: None, calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl CompletionService for Scripted {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.clone());
        self.reply.clone().ok_or_else(|| anyhow!("401 invalid api key"))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn app_state(provider: Arc<Scripted>) -> AppState {
    let provider: DynProvider = provider;
    AppState { provider }
}

/// A proxy on a loopback port. Dropping it stops the server.
pub struct RunningProxy {
    pub base_url: String,
    _stop: oneshot::Sender<()>,
}

pub async fn spawn_proxy(provider: Arc<Scripted>) -> RunningProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server::run(listener, app_state(provider), async move {
        let _ = rx.await;
    }));
    RunningProxy { base_url: format!("http://{}", addr), _stop: tx }
}

/// Serve an arbitrary router on a loopback port, for hand-written proxy replies.
pub async fn spawn_router(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

pub const NOTES: &str = "The sky is blue. Water boils at 100C. Plants need sunlight.";

pub const FLASHCARDS_REPLY: &str = r#"Here are your flashcards:
[
  {"front": "What color is the sky?", "back": "Blue"},
  {"front": "At what temperature does water boil?", "back": "100C"}
]
Happy studying!"#;

pub const QUIZ_REPLY: &str = r#"[
  {"question": "At what temperature does water boil?", "options": ["0C", "50C", "90C", "100C"], "correct": 3},
  {"question": "What do plants need?", "options": ["Sunlight", "Sand", "Salt", "Smoke"], "correct": 0}
]"#;
