//! Directory discovery and parallel batch chunking

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::chunking::Chunker;
use crate::error::{Error, Result};
use crate::extraction::{load_document, DocumentFormat};
use crate::types::ChunkResult;

/// Longest error excerpt shown in a summary row
const STATUS_MESSAGE_LIMIT: usize = 50;

/// Find supported documents in `dir` whose file names match `pattern`.
///
/// `pattern` accepts `*` and `?` wildcards and is matched against the file
/// name only. Results are sorted by path.
pub fn discover_files(dir: impl AsRef<Path>, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::config(format!("not a directory: {}", dir.display())));
    }

    let matcher = glob_to_regex(pattern)?;
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| matcher.is_match(&e.file_name().to_string_lossy()))
        .filter(|e| DocumentFormat::from_path(e.path()).is_some())
        .map(|e| e.into_path())
        .collect();

    files.sort();
    tracing::debug!("Discovered {} files in {} matching '{}'", files.len(), dir.display(), pattern);

    Ok(files)
}

/// Compile a `*`/`?` file name pattern into an anchored regex
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(Error::config("file pattern must not be empty"));
    }

    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|e| Error::config(format!("invalid file pattern '{}': {}", pattern, e)))
}

/// Cooperative cancellation shared between a batch and its controller.
///
/// Checked before each document starts; a document already in progress
/// always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a file ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    Failed,
    Cancelled,
}

/// What a batch keeps per file once the result has gone to the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummaryRow {
    pub file: String,
    pub path: PathBuf,
    pub chunks: usize,
    pub tokens: usize,
    pub kind: OutcomeKind,
    /// `success`, `cancelled`, or `error: <message excerpt>`
    pub status: String,
}

impl BatchSummaryRow {
    fn new(path: &Path, outcome: &Result<ChunkResult>) -> Self {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let (chunks, tokens, kind, status) = match outcome {
            Ok(result) => (
                result.total_chunks(),
                result.total_tokens(),
                OutcomeKind::Success,
                "success".to_string(),
            ),
            Err(Error::Cancelled) => (0, 0, OutcomeKind::Cancelled, "cancelled".to_string()),
            Err(e) => {
                let message: String = e.to_string().chars().take(STATUS_MESSAGE_LIMIT).collect();
                (0, 0, OutcomeKind::Failed, format!("error: {}", message))
            }
        };

        Self {
            file,
            path: path.to_path_buf(),
            chunks,
            tokens,
            kind,
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}

/// Per-file summaries of a batch run, in input order
#[derive(Debug)]
pub struct BatchReport {
    rows: Vec<BatchSummaryRow>,
    elapsed: Duration,
}

impl BatchReport {
    pub fn rows(&self) -> &[BatchSummaryRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<BatchSummaryRow> {
        self.rows
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn succeeded(&self) -> usize {
        self.count(OutcomeKind::Success)
    }

    /// Files that failed, excluding cancelled ones
    pub fn failed(&self) -> usize {
        self.count(OutcomeKind::Failed)
    }

    pub fn cancelled(&self) -> usize {
        self.count(OutcomeKind::Cancelled)
    }

    pub fn total_chunks(&self) -> usize {
        self.rows.iter().map(|r| r.chunks).sum()
    }

    pub fn total_tokens(&self) -> usize {
        self.rows.iter().map(|r| r.tokens).sum()
    }

    fn count(&self, kind: OutcomeKind) -> usize {
        self.rows.iter().filter(|r| r.kind == kind).count()
    }
}

/// Runs extraction and chunking for many files on a dedicated thread pool
pub struct BatchProcessor {
    chunker: Chunker,
    workers: usize,
    cancel: CancellationFlag,
}

impl BatchProcessor {
    /// One worker per CPU
    pub fn new(chunker: Chunker) -> Self {
        Self {
            chunker,
            workers: num_cpus::get(),
            cancel: CancellationFlag::new(),
        }
    }

    /// Set the worker count; 0 means one per CPU
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 { num_cpus::get() } else { workers };
        self
    }

    /// Share an externally controlled cancellation flag
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    pub fn run(&self, files: &[PathBuf]) -> Result<BatchReport> {
        self.run_with_sink(files, |_, _| Ok(()), |_| {})
    }

    pub fn run_with_progress<P>(&self, files: &[PathBuf], progress: P) -> Result<BatchReport>
    where
        P: Fn(&BatchSummaryRow) + Send + Sync,
    {
        self.run_with_sink(files, |_, _| Ok(()), progress)
    }

    /// Process `files`, handing each result to `sink` on the worker that
    /// produced it, then calling `progress` with the file's summary.
    ///
    /// Results are dropped once the sink returns, so memory does not grow
    /// with the batch. A sink error is recorded as that file's failure. Only
    /// failing to start the worker pool is an error.
    pub fn run_with_sink<S, P>(&self, files: &[PathBuf], sink: S, progress: P) -> Result<BatchReport>
    where
        S: Fn(&Path, &ChunkResult) -> Result<()> + Send + Sync,
        P: Fn(&BatchSummaryRow) + Send + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("ragchunk-worker-{}", i))
            .build()
            .map_err(|e| Error::config(format!("failed to start worker pool: {}", e)))?;

        tracing::info!("Processing {} files with {} workers", files.len(), self.workers);
        let start = Instant::now();

        let rows: Vec<BatchSummaryRow> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let outcome = self
                        .process_one(path)
                        .and_then(|result| sink(path.as_path(), &result).map(|()| result));
                    if let Err(e) = &outcome {
                        if !matches!(e, Error::Cancelled) {
                            tracing::warn!("Failed to process {}: {}", path.display(), e);
                        }
                    }

                    let row = BatchSummaryRow::new(path, &outcome);
                    progress(&row);
                    row
                })
                .collect()
        });

        let report = BatchReport {
            rows,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Batch finished in {:.2?}: {} succeeded, {} failed, {} cancelled, {} chunks",
            report.elapsed(),
            report.succeeded(),
            report.failed(),
            report.cancelled(),
            report.total_chunks()
        );

        Ok(report)
    }

    fn process_one(&self, path: &Path) -> Result<ChunkResult> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let document = load_document(path)?;
        self.chunker.chunk(&document)
    }
}
