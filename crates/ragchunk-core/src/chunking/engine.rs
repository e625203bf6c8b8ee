//! Greedy, word-aligned windowing with token overlap

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::search;
use super::words::Words;
use crate::config::ChunkConfig;
use crate::error::Result;
use crate::extraction;
use crate::tokenizer::{TokenCounter, TokenizerRegistry};
use crate::types::{ChunkResult, ChunkResultBuilder, Document};

/// Token-aware document chunker
///
/// Splits text on whitespace and packs as many consecutive words as fit into
/// `max_tokens`, then restarts just far enough back to carry at least
/// `overlap_tokens` of context into the next chunk. A single word that alone
/// exceeds the budget becomes its own chunk, unsplit, with its true count.
///
/// # Example
///
/// ```
/// use ragchunk_core::{ChunkConfig, Chunker};
///
/// let config = ChunkConfig::new(3, 1).with_model("words");
/// let chunker = Chunker::new(config).unwrap();
/// let result = chunker.chunk_text("one two three four five", "inline").unwrap();
///
/// assert_eq!(result.to_texts(), vec!["one two three", "three four five"]);
/// ```
#[derive(Clone)]
pub struct Chunker {
    config: ChunkConfig,
    counter: Arc<dyn TokenCounter>,
}

/// A window chosen for emission: words `[start, end)`
struct Window {
    end: usize,
    text: String,
    token_count: usize,
}

impl Chunker {
    /// Validate `config` and resolve its model through the global registry
    pub fn new(config: ChunkConfig) -> Result<Self> {
        Self::with_registry(config, TokenizerRegistry::global())
    }

    /// Validate `config` and resolve its model through `registry`
    pub fn with_registry(config: ChunkConfig, registry: &TokenizerRegistry) -> Result<Self> {
        config.validate()?;
        let counter = registry.resolve(&config.model)?;
        Ok(Self { config, counter })
    }

    /// Validate `config` and use an explicit counter, ignoring `config.model`
    pub fn with_counter(config: ChunkConfig, counter: Arc<dyn TokenCounter>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, counter })
    }

    /// Configuration in use
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Token counter in use
    pub fn counter(&self) -> &Arc<dyn TokenCounter> {
        &self.counter
    }

    /// Extract a file and chunk its text
    pub fn process(&self, path: impl AsRef<Path>) -> Result<ChunkResult> {
        let document = extraction::load_document(path)?;
        self.chunk(&document)
    }

    /// Chunk raw text under a reporting name
    pub fn chunk_text(&self, text: &str, source_name: &str) -> Result<ChunkResult> {
        self.chunk(&Document::new(text, source_name))
    }

    /// Chunk a document
    ///
    /// Empty or whitespace-only text yields an empty result, not an error.
    pub fn chunk(&self, document: &Document) -> Result<ChunkResult> {
        self.run(document).map_err(|e| {
            e.in_document(
                &document.source_name,
                self.config.max_tokens,
                self.config.overlap_tokens,
            )
        })
    }

    fn run(&self, document: &Document) -> Result<ChunkResult> {
        let words = Words::split(&document.text);
        let mut builder = ChunkResultBuilder::new(
            &document.source_name,
            document.text.chars().count(),
            self.config.clone(),
        );

        let mut start = 0;
        while start < words.len() {
            let window = self.next_window(&words, start)?;
            let end = window.end;

            let chunk = builder.push(window.text, window.token_count);
            tracing::debug!(
                "Chunk {} covers words {}..{} ({} tokens)",
                chunk.index,
                start,
                end,
                chunk.token_count
            );

            if end >= words.len() {
                break;
            }
            start = self.next_start(&words, start, end)?;
        }

        let result = builder.build();
        tracing::info!(
            "Chunked '{}': {} chunks, {} tokens, {} chars",
            result.source(),
            result.total_chunks(),
            result.total_tokens(),
            result.total_chars()
        );

        Ok(result)
    }

    /// Longest window starting at `start` within budget, or the lone
    /// oversized word at `start`
    fn next_window(&self, words: &Words<'_>, start: usize) -> Result<Window> {
        let max_tokens = self.config.max_tokens;

        let first = words.join(start..start + 1);
        let first_count = self.counter.count_tokens(&first)?;
        if first_count > max_tokens {
            tracing::debug!(
                "Word {} alone has {} tokens (budget {}), emitting it unsplit",
                start,
                first_count,
                max_tokens
            );
            return Ok(Window {
                end: start + 1,
                text: first,
                token_count: first_count,
            });
        }

        let hint = if self.counter.supports_offsets() {
            self.end_hint(words, start)?
        } else {
            None
        };

        let mut counts = HashMap::from([(start + 1, first_count)]);
        let end = search::last_true(start + 1, words.len(), hint, |end| {
            let count = self.counter.count_tokens(&words.join(start..end))?;
            counts.insert(end, count);
            Ok(count <= max_tokens)
        })?;

        let text = words.join(start..end);
        let token_count = match counts.get(&end) {
            Some(&count) => count,
            None => self.counter.count_tokens(&text)?,
        };

        Ok(Window {
            end,
            text,
            token_count,
        })
    }

    /// Guess the window end from token offsets of a bounded lookahead.
    ///
    /// Every word costs at least one token, so `max_tokens + 1` words always
    /// reach past the budget.
    fn end_hint(&self, words: &Words<'_>, start: usize) -> Result<Option<usize>> {
        let max_tokens = self.config.max_tokens;
        let ahead_end = words.len().min(start.saturating_add(max_tokens).saturating_add(1));
        let ahead = words.join(start..ahead_end);

        let Some(offsets) = self.counter.token_offsets(&ahead)? else {
            return Ok(None);
        };
        if offsets.len() <= max_tokens {
            return Ok(Some(ahead_end));
        }

        // First byte past the budget
        let boundary = offsets[max_tokens];
        let fitting = words
            .spans(start..ahead_end)
            .iter()
            .take_while(|&&(_, word_end)| word_end <= boundary)
            .count();

        Ok(Some(start + fitting.max(1)))
    }

    /// Where the next window starts after emitting `[start, end)`.
    ///
    /// Backs off from `end` by the fewest words whose joined count reaches
    /// `overlap_tokens`. If that would need the whole window (or the window is
    /// a single word) the cursor moves to `end`, so progress is guaranteed.
    ///
    /// Suffix counts are not monotone under BPE: prepending a word puts a
    /// space before the suffix's first word, which can merge into fewer
    /// tokens. The scan therefore grows one word at a time.
    fn next_start(&self, words: &Words<'_>, start: usize, end: usize) -> Result<usize> {
        let overlap = self.config.overlap_tokens;
        let window_len = end - start;
        if overlap == 0 || window_len < 2 {
            return Ok(end);
        }

        for k in 1..window_len {
            if self.counter.count_tokens(&words.join(end - k..end))? >= overlap {
                return Ok(end - k);
            }
        }

        tracing::debug!(
            "Window {}..{} cannot supply {} overlap tokens, advancing without overlap",
            start,
            end,
            overlap
        );
        Ok(end)
    }
}

impl std::fmt::Debug for Chunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunker")
            .field("config", &self.config)
            .field("counter", &self.counter.name())
            .finish()
    }
}
