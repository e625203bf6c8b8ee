//! Subcommand implementations

pub mod batch;
pub mod info;
pub mod process;

pub use batch::BatchArgs;
pub use process::ProcessArgs;

use anyhow::{Context, Result};
use ragchunk_core::{AppConfig, ChunkConfig, Chunker, TokenizerRegistry};

/// Chunking flags shared by `process` and `batch`; unset flags fall back to
/// the configuration file
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ChunkingArgs {
    /// Maximum tokens per chunk [default: 1000]
    #[arg(short = 'm', long)]
    pub max_tokens: Option<usize>,

    /// Overlap tokens between consecutive chunks [default: 100]
    #[arg(short = 'l', long = "overlap")]
    pub overlap_tokens: Option<usize>,

    /// Tokenizer model: gpt-4, gpt-4o, cl100k_base, words, approx, hf:<tokenizer.json>
    #[arg(long)]
    pub model: Option<String>,
}

impl ChunkingArgs {
    pub fn resolve(&self, config: &AppConfig) -> ChunkConfig {
        let mut resolved = config.chunking.clone();
        if let Some(max_tokens) = self.max_tokens {
            resolved.max_tokens = max_tokens;
        }
        if let Some(overlap_tokens) = self.overlap_tokens {
            resolved.overlap_tokens = overlap_tokens;
        }
        if let Some(model) = &self.model {
            resolved.model = model.clone();
        }
        resolved
    }

    /// Validate settings and load the tokenizer before touching any document
    pub fn build_chunker(&self, config: &AppConfig) -> Result<Chunker> {
        let chunk_config = self.resolve(config);
        let registry = TokenizerRegistry::new(config.tokenizer.cache_capacity);

        Chunker::with_registry(chunk_config, &registry).context("Invalid chunking settings")
    }
}
