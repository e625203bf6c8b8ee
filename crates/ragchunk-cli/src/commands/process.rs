//! `ragchunk process`

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use ragchunk_core::{AppConfig, ChunkResult, Document};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::ChunkingArgs;
use crate::output;

/// Name reported for text read from standard input
const STDIN_SOURCE: &str = "stdin";

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Document to process (pdf, docx, xlsx, xls, csv, pptx, txt, md), or `-` for stdin
    pub file: String,

    /// Write the JSON result to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub chunking: ChunkingArgs,

    /// Preview the first N chunks
    #[arg(short, long, default_value_t = 0, value_name = "N")]
    pub preview: usize,

    /// Minimal output; prints JSON to stdout when no output file is given
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn run(args: ProcessArgs, config: &AppConfig) -> Result<()> {
    let chunker = args.chunking.build_chunker(config)?;

    let source = if args.file == "-" { None } else { Some(PathBuf::from(&args.file)) };
    if let Some(path) = &source {
        if !path.exists() {
            bail!("File not found: {}", path.display());
        }
    }

    if !args.quiet {
        output::print_banner(&display_name(source.as_deref()));
    }

    let spinner = spinner(args.quiet);
    let result: Result<ChunkResult> = match &source {
        Some(path) => chunker
            .process(path)
            .with_context(|| format!("Failed to process {}", path.display())),
        None => read_stdin().and_then(|text| {
            chunker
                .chunk(&Document::new(text, STDIN_SOURCE))
                .context("Failed to process standard input")
        }),
    };
    spinner.finish_and_clear();
    let result = result?;

    if !args.quiet {
        println!("{}", output::format_summary(&result));
        if args.preview > 0 {
            println!("{}", output::format_preview(&result, args.preview));
        }
    }

    let json = result.to_json_pretty()?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            if !args.quiet {
                println!("\n{} {}", console::style("Saved to:").green(), path.display());
            }
        }
        None if args.quiet => println!("{}", json),
        None => {}
    }

    Ok(())
}

fn display_name(source: Option<&Path>) -> String {
    source
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| STDIN_SOURCE.to_string())
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read standard input")?;
    Ok(text)
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Extracting and chunking...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
