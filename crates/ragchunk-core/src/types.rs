//! Document, chunk and result types

use serde::{Deserialize, Serialize};

use crate::config::ChunkConfig;
use crate::error::Result;

/// Extracted document text, ready for chunking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Plain UTF-8 text produced by an extractor
    pub text: String,
    /// Name used when reporting (usually the file name)
    pub source_name: String,
}

impl Document {
    /// Create a new document
    pub fn new(text: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_name: source_name.into(),
        }
    }
}

/// A contiguous, word-aligned slice of a document within a token budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the result (0-based, dense)
    pub index: usize,
    /// Chunk text, words joined by single spaces
    pub text: String,
    /// Exact token count under the configured tokenizer
    pub token_count: usize,
    /// Length of `text` in characters
    pub char_count: usize,
}

/// Result of chunking one document
///
/// Field order matches the serialized layout consumed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResult {
    source: String,
    total_chunks: usize,
    total_tokens: usize,
    total_chars: usize,
    config: ChunkConfig,
    chunks: Vec<Chunk>,
}

impl ChunkResult {
    /// Source name of the chunked document
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of chunks
    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Sum of chunk token counts (overlapping tokens counted once per chunk)
    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    /// Character length of the original document text
    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    /// Configuration used to produce this result
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Chunks in index order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// True when the document contained no words
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Just the text of each chunk, e.g. for an embedding call
    pub fn to_texts(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.text.clone()).collect()
    }

    /// Integer average of tokens per chunk (0 for an empty result)
    pub fn average_tokens(&self) -> usize {
        self.total_tokens / self.total_chunks.max(1)
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Take ownership of the chunks
    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}

/// Append-only builder used during a single chunking pass
#[derive(Debug)]
pub(crate) struct ChunkResultBuilder {
    source: String,
    total_chars: usize,
    config: ChunkConfig,
    chunks: Vec<Chunk>,
    total_tokens: usize,
}

impl ChunkResultBuilder {
    pub(crate) fn new(source: impl Into<String>, total_chars: usize, config: ChunkConfig) -> Self {
        Self {
            source: source.into(),
            total_chars,
            config,
            chunks: Vec::new(),
            total_tokens: 0,
        }
    }

    /// Append the next chunk; its index is its position
    pub(crate) fn push(&mut self, text: String, token_count: usize) -> &Chunk {
        let index = self.chunks.len();
        let char_count = text.chars().count();
        self.total_tokens += token_count;
        self.chunks.push(Chunk {
            index,
            text,
            token_count,
            char_count,
        });
        &self.chunks[index]
    }

    pub(crate) fn build(self) -> ChunkResult {
        ChunkResult {
            source: self.source,
            total_chunks: self.chunks.len(),
            total_tokens: self.total_tokens,
            total_chars: self.total_chars,
            config: self.config,
            chunks: self.chunks,
        }
    }
}
