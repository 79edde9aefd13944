//! Bedtime story generator CLI.
//!
//! Asks for a story request, runs the generate→judge loop against an
//! OpenAI-compatible model, prints the result, and offers one revision.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bedtime::exit_codes;
use bedtime::io::config::{DEFAULT_CONFIG_FILE, load_config};
use bedtime::io::model::OpenAiClient;
use bedtime::logging;
use bedtime::orchestrator::Orchestrator;
use bedtime::session::run_session;
use clap::Parser;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "bedtime",
    version,
    about = "Generate bedtime stories checked by an LLM judge"
)]
struct Cli {
    /// TOML config file. Missing file means built-in defaults.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override `max_attempts` from the config (capped at 3).
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Print the final result as JSON after the session.
    #[arg(long)]
    json: bool,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILED);
    }
    std::process::exit(exit_codes::OK);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let cfg = load_config(&cli.config)?;
    let max_attempts = cli.max_attempts.unwrap_or(cfg.max_attempts);
    debug!(config = %cli.config.display(), max_attempts, model = %cfg.model.name, "config loaded");

    let client = OpenAiClient::from_env(&cfg.model)?;
    let orchestrator = Orchestrator::new(&client, &cfg.calls);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut out = stdout.lock();
    let result = run_session(&orchestrator, max_attempts, &mut input, &mut out)?;

    if cli.json {
        let payload = serde_json::to_string_pretty(&result).context("serialize result")?;
        writeln!(out, "{payload}")?;
    }
    Ok(())
}
