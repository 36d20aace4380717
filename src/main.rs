use anyhow::{Context, Result};
use clap::Parser;
use fs_err as fs;
use std::time::Duration;

use mindspark::cli::{Args, Command, GenerateArgs};
use mindspark::client::{ProxyClient, StudySession};
use mindspark::config::{Config, ProviderKind};
use mindspark::errors::MindSparkError;
use mindspark::render::{self, View};
use mindspark::state::{FileStorage, SessionStore};
use mindspark::wire::{Mode, Outcome};
use mindspark::{log, provider, server, ux};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    log::init(args.debug)?;

    let mut cfg = Config::load(args.config.as_deref())?;
    args.apply(&mut cfg);

    match &args.command {
        Command::Serve(_) => serve(&cfg).await,
        Command::Stats => {
            let store = SessionStore::load(FileStorage::new(&cfg.state_path));
            ux::print_dashboard(store.state());
            Ok(())
        }
        Command::Health(_) => {
            let client = ProxyClient::new(cfg.server_url.clone(), Duration::from_secs(cfg.timeout_secs))?;
            let health = client.health().await?;
            println!("{}: {}", client.base_url(), health.status);
            Ok(())
        }
        Command::Summary(g) | Command::Eli5(g) | Command::Flashcards(g) | Command::Quiz(g) => {
            let mode = args.command.mode().context("generate command without a mode")?;
            generate(&cfg, mode, g).await
        }
    }
}

async fn serve(cfg: &Config) -> Result<()> {
    let key_var = match cfg.provider {
        ProviderKind::OpenAI => Some(provider::openai::API_KEY_VAR),
        ProviderKind::Anthropic => Some(provider::anthropic::API_KEY_VAR),
        ProviderKind::Ollama => None,
    };
    if let Some(var) = key_var {
        if std::env::var(var).is_err() {
            tracing::warn!("{var} is not set; generation requests will fail");
        }
    }
    let prov = provider::make_provider(cfg)?;
    server::serve(cfg, prov).await
}

fn read_notes(g: &GenerateArgs) -> Result<String> {
    match (&g.text, &g.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => {
            let text = fs::read_to_string(path)?;
            ux::print_source(path, &text);
            Ok(text)
        }
        (None, None) => ux::prompt("Paste your notes:").context("no notes given"),
    }
}

async fn generate(cfg: &Config, mode: Mode, g: &GenerateArgs) -> Result<()> {
    let mut store = SessionStore::load(FileStorage::new(&cfg.state_path))
        .with_refresh(ux::print_status_line);
    store.record_activity();

    let client = ProxyClient::new(cfg.server_url.clone(), Duration::from_secs(cfg.timeout_secs))?;
    let mut session = StudySession::new(client, store);
    let text = read_notes(g)?;

    let outcome = match session.generate(&text, mode, &mut ux::Spinner::default()).await {
        Ok(outcome) => outcome,
        Err(MindSparkError::Validation(msg)) => {
            println!("{msg}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut view = render::render(&outcome);
    match &mut view {
        View::Flashcards(deck) if !g.no_interactive => ux::run_flashcards(deck),
        View::Quiz(board) if !g.no_interactive => ux::run_quiz(&mut session, board),
        other => ux::print_view(other),
    }

    if matches!(outcome, Outcome::Ready(_)) {
        ux::print_dashboard(session.store().state());
    }
    Ok(())
}
