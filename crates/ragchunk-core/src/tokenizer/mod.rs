//! Token counting adapters
//!
//! Every adapter answers `count_tokens`. Adapters that can also report where
//! each token starts advertise it through `supports_offsets`, which lets the
//! chunker jump close to a window boundary with a single tokenization instead
//! of searching for it.

mod cache;
#[cfg(feature = "huggingface")]
mod huggingface;
mod registry;
mod simple;
mod tiktoken;

pub use cache::CachedCounter;
#[cfg(feature = "huggingface")]
pub use huggingface::HuggingFaceCounter;
pub use registry::TokenizerRegistry;
pub use simple::{CharEstimateCounter, WordCounter};
pub use tiktoken::TiktokenCounter;

use crate::error::Result;

/// Deterministic, stateless token counting for one model
pub trait TokenCounter: Send + Sync {
    /// Model identifier this counter was built for
    fn name(&self) -> &str;

    /// Number of tokens in `text`
    fn count_tokens(&self, text: &str) -> Result<usize>;

    /// Whether `token_offsets` returns real boundaries
    fn supports_offsets(&self) -> bool {
        false
    }

    /// Byte offsets (ascending) where each token of `text` starts, one entry
    /// per token. `None` when the adapter cannot expose boundaries.
    fn token_offsets(&self, _text: &str) -> Result<Option<Vec<usize>>> {
        Ok(None)
    }
}
