//! ragchunk - token-aware document chunking from the terminal
//!
//! # Usage
//!
//! ```bash
//! # Chunk one document and save the result
//! ragchunk process report.pdf -o report.json
//! ragchunk process notes.md -m 500 -l 50 -p 3
//!
//! # Pipe text through, JSON on stdout
//! cat notes.txt | ragchunk process - -q
//!
//! # Chunk a whole directory
//! ragchunk batch ./docs -o ./chunks -g "*.pdf" -r
//!
//! # Supported formats and defaults
//! ragchunk info
//! ```

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use ragchunk_core::AppConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use commands::{BatchArgs, ProcessArgs};

/// Fast, token-aware document chunking for RAG pipelines.
///
/// Everything runs locally; no document content leaves the machine.
#[derive(Parser)]
#[command(name = "ragchunk", version, about)]
struct Cli {
    /// TOML configuration file ([chunking], [tokenizer], [batch])
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split one document into chunks
    Process(ProcessArgs),
    /// Chunk every supported document in a directory
    Batch(BatchArgs),
    /// Show supported formats and default settings
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let quiet = matches!(&cli.command, Command::Process(args) if args.quiet);
    init_logging(cli.verbose, quiet);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Process(args) => commands::process::run(args, &config),
        Command::Batch(args) => commands::batch::run(args, &config),
        Command::Info => {
            commands::info::run(&config);
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise info, raised by `-v` and lowered by `--quiet`
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (verbose, quiet) {
        (0, true) => "warn",
        (0, false) => "info",
        (1, _) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ragchunk={level},ragchunk_core={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let config = AppConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::debug!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(AppConfig::default()),
    }
}
