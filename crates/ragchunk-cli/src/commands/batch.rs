//! `ragchunk batch`

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use ragchunk_core::{discover_files, AppConfig, BatchProcessor, ChunkResult};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::ChunkingArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory containing documents
    pub directory: PathBuf,

    /// Write one `<name>.json` per document into this directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub chunking: ChunkingArgs,

    /// File name pattern (`*` and `?` wildcards) [default: *]
    #[arg(short = 'g', long = "glob", value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Parallel workers [default: CPU count]
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,
}

pub fn run(args: BatchArgs, config: &AppConfig) -> Result<()> {
    if !args.directory.is_dir() {
        bail!("Not a directory: {}", args.directory.display());
    }

    let chunker = args.chunking.build_chunker(config)?;

    let pattern = args.pattern.as_deref().unwrap_or(&config.batch.pattern);
    let recursive = args.recursive || config.batch.recursive;
    let files = discover_files(&args.directory, pattern, recursive)?;

    if files.is_empty() {
        println!("{}", console::style("No supported files found.").yellow());
        return Ok(());
    }
    println!("{}\n", console::style(format!("Found {} files to process", files.len())).bold());

    let targets = match &args.output {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
            output_paths(dir, &args.directory, &files)
        }
        None => HashMap::new(),
    };

    let workers = args.workers.unwrap_or_else(|| config.batch.worker_count());
    let processor = BatchProcessor::new(chunker).with_workers(workers);

    let progress = ProgressBar::new(files.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
        progress.set_style(style.progress_chars("##-"));
    }
    progress.set_message("Processing files...");

    let report = processor.run_with_sink(
        &files,
        |path, result| match targets.get(path) {
            Some(target) => write_result(target, result),
            None => Ok(()),
        },
        |row| {
            progress.set_message(row.file.clone());
            progress.inc(1);
        },
    )?;
    progress.finish_and_clear();

    println!("{}", output::format_batch_table(report.rows()));
    println!(
        "\n{} succeeded, {} failed in {:.2?} ({} chunks, {} tokens)",
        report.succeeded(),
        report.failed(),
        report.elapsed(),
        output::format_count(report.total_chunks()),
        output::format_count(report.total_tokens())
    );

    Ok(())
}

fn write_result(target: &Path, result: &ChunkResult) -> ragchunk_core::Result<()> {
    std::fs::write(target, result.to_json_pretty()?).map_err(|e| {
        ragchunk_core::Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to write {}: {}", target.display(), e),
        ))
    })
}

/// One JSON path per input file inside `dir`.
///
/// Files get `<stem>.json` when that name is free. Later files whose stem is
/// taken fall back to `<file name>.json`, then to their path below `root`
/// with separators replaced by `_`, then to a numbered variant.
fn output_paths(dir: &Path, root: &Path, files: &[PathBuf]) -> HashMap<PathBuf, PathBuf> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut targets = HashMap::with_capacity(files.len());

    for file in files {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let file_name = file
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| stem.clone());
        let relative = file
            .strip_prefix(root)
            .unwrap_or(file)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("_");

        let candidates = [stem.clone(), file_name, relative.clone()];
        let name = match candidates.into_iter().find(|candidate| !taken.contains(candidate)) {
            Some(name) => name,
            None => (2usize..)
                .map(|n| format!("{}-{}", relative, n))
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or(relative),
        };

        if name != stem {
            tracing::warn!("{}.json is taken, writing {} as {}.json", stem, file.display(), name);
        }
        taken.insert(name.clone());
        targets.insert(file.clone(), dir.join(format!("{}.json", name)));
    }

    targets
}
