use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, ProviderKind};
use crate::wire::Mode;

#[derive(Parser, Debug)]
#[command(name = "mindspark", version, about = "Study notes in, summaries, flashcards and quizzes out")]
pub struct Args {
    /// TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session state file (overrides config).
    #[arg(long, global = true)]
    pub state: Option<String>,

    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the generation proxy.
    Serve(ServeArgs),
    /// Summarize notes into key takeaways.
    Summary(GenerateArgs),
    /// Explain notes like I'm five.
    Eli5(GenerateArgs),
    /// Turn notes into flashcards.
    Flashcards(GenerateArgs),
    /// Quiz yourself on notes.
    Quiz(GenerateArgs),
    /// Show XP, streak and level.
    Stats,
    /// Ping the proxy.
    Health(ServerArgs),
}

impl Command {
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Command::Summary(_) => Some(Mode::Summary),
            Command::Eli5(_) => Some(Mode::Eli5),
            Command::Flashcards(_) => Some(Mode::Flashcards),
            Command::Quiz(_) => Some(Mode::Quiz),
            _ => None,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(ClapArgs, Debug)]
pub struct ServerArgs {
    /// Proxy base URL.
    #[arg(long)]
    pub server: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct GenerateArgs {
    /// Notes to send.
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read notes from a text file.
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub server: ServerArgs,

    /// Print the result without the interactive loop.
    #[arg(long, default_value_t = false)]
    pub no_interactive: bool,
}

impl Args {
    /// Fold command-line overrides into the loaded config.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(state) = &self.state {
            cfg.state_path = state.clone();
        }
        match &self.command {
            Command::Serve(s) => {
                if let Some(h) = &s.host { cfg.host = h.clone(); }
                if let Some(p) = s.port { cfg.port = p; }
                if let Some(k) = s.provider { cfg.provider = k; }
                if let Some(m) = &s.model { cfg.model = m.clone(); }
                if let Some(t) = s.timeout_secs { cfg.timeout_secs = t; }
            }
            Command::Summary(g) | Command::Eli5(g) | Command::Flashcards(g) | Command::Quiz(g) => {
                if let Some(url) = &g.server.server { cfg.server_url = url.clone(); }
            }
            Command::Health(s) => {
                if let Some(url) = &s.server { cfg.server_url = url.clone(); }
            }
            Command::Stats => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_override_config() {
        let args = Args::parse_from(["mindspark", "serve", "--port", "8081", "--provider", "ollama", "--model", "llama3"]);
        let mut cfg = Config::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.provider, ProviderKind::Ollama);
        assert_eq!(cfg.model, "llama3");
    }

    #[test]
    fn generate_subcommands_carry_mode() {
        let args = Args::parse_from(["mindspark", "quiz", "--text", "Plants need sunlight.", "--server", "http://h:1"]);
        assert_eq!(args.command.mode(), Some(Mode::Quiz));
        let mut cfg = Config::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.server_url, "http://h:1");
    }

    #[test]
    fn text_and_file_conflict() {
        let res = Args::try_parse_from(["mindspark", "summary", "--text", "a", "--file", "notes.txt"]);
        assert!(res.is_err());
    }
}
