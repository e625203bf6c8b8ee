//! Configuration for chunking, tokenization and batch runs

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default hard ceiling of tokens per chunk
pub const DEFAULT_MAX_TOKENS: usize = 1000;

/// Default trailing-token overlap between consecutive chunks
pub const DEFAULT_OVERLAP_TOKENS: usize = 100;

/// Default tokenizer model (GPT-4 class, cl100k_base)
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default number of cached token counts per model
pub const DEFAULT_CACHE_CAPACITY: usize = 65_536;

/// Top-level configuration, usually loaded from a TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkConfig,
    /// Tokenizer configuration
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    /// Batch processing configuration
    #[serde(default)]
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

/// Chunking configuration
///
/// `overlap_tokens` must be strictly smaller than `max_tokens`, otherwise the
/// chunker could never move past a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum tokens per chunk
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Target overlap (in tokens) with the preceding chunk
    #[serde(default = "default_overlap_tokens")]
    pub overlap_tokens: usize,
    /// Tokenizer model identifier
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_max_tokens() -> usize { DEFAULT_MAX_TOKENS }
fn default_overlap_tokens() -> usize { DEFAULT_OVERLAP_TOKENS }
fn default_model() -> String { DEFAULT_MODEL.to_string() }

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ChunkConfig {
    /// Create a configuration with the default model
    pub fn new(max_tokens: usize, overlap_tokens: usize) -> Self {
        Self {
            max_tokens,
            overlap_tokens,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Replace the tokenizer model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Reject settings that would make chunking impossible. Never clamps.
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(Error::config("max_tokens must be a positive integer"));
        }

        if self.overlap_tokens >= self.max_tokens {
            return Err(Error::config(format!(
                "overlap_tokens ({}) must be smaller than max_tokens ({})",
                self.overlap_tokens, self.max_tokens
            )));
        }

        if self.model.trim().is_empty() {
            return Err(Error::config("model must not be empty"));
        }

        Ok(())
    }
}

/// Tokenizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Cached token counts per model (0 disables the cache)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_cache_capacity() -> usize { DEFAULT_CACHE_CAPACITY }

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of parallel document workers (default: CPU count)
    #[serde(default)]
    pub workers: Option<usize>,
    /// File name pattern (`*` and `?` wildcards)
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Descend into subdirectories
    #[serde(default)]
    pub recursive: bool,
}

fn default_pattern() -> String { "*".to_string() }

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: None,
            pattern: default_pattern(),
            recursive: false,
        }
    }
}

impl BatchConfig {
    /// Effective worker count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }
}
