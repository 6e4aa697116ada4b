//! Chatscroll CLI
//!
//! Runs the terminal chat demo, or replays a scripted scroll scenario
//! headlessly and prints what the engine did.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use chatscroll::replay::{self, Script};
use chatscroll::tui::App;
use chatscroll::ChatScrollConfig;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Chatscroll - auto-scroll coordination for chat message lists
#[derive(Parser, Debug)]
#[command(name = "chatscroll")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output: debug-level engine logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal transcript with a simulated streaming agent
    Tui {
        /// Write logs to this file instead of discarding them
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Replay a JSON-lines scroll script and print the report as JSON
    Replay {
        /// Script file
        script: PathBuf,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ChatScrollConfig::load_or_default(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Tui { log_file: None }) {
        Command::Tui { log_file } => {
            let config = match log_file {
                Some(path) => config.with_log_file(path),
                None => config,
            };
            run_tui(config, cli.verbose).await
        }
        Command::Replay { script, pretty } => run_replay(config, cli.verbose, script, pretty),
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

async fn run_tui(config: ChatScrollConfig, verbose: bool) -> anyhow::Result<()> {
    // The alternate screen owns stdout; logs only go to a file.
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(verbose))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
        info!(?config, "starting chatscroll tui");
    }

    let mut app = App::new(config)?;
    app.run().await?;
    Ok(())
}

fn run_replay(
    config: ChatScrollConfig,
    verbose: bool,
    script: PathBuf,
    pretty: bool,
) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let script = Script::load(&script)?;
    let report = replay::run(&script, &config);
    println!("{}", report.to_json(pretty)?);
    Ok(())
}
