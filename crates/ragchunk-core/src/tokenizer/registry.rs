//! Model name -> token counter resolution

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{CachedCounter, CharEstimateCounter, TiktokenCounter, TokenCounter, WordCounter};
use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::error::{Error, Result};

static GLOBAL: Lazy<TokenizerRegistry> = Lazy::new(TokenizerRegistry::default);

/// Resolves model identifiers to shared counters, loading each model once
///
/// Recognized identifiers:
/// - `words`: one token per whitespace-separated word
/// - `approx`: ~4 characters per token
/// - `hf:<path>`: HuggingFace `tokenizer.json` (feature `huggingface`)
/// - anything else: a tiktoken model or encoding name (`gpt-4`, `cl100k_base`, ...)
pub struct TokenizerRegistry {
    counters: RwLock<HashMap<String, Arc<dyn TokenCounter>>>,
    cache_capacity: usize,
}

impl TokenizerRegistry {
    /// Create a registry; `cache_capacity` of 0 disables count caching
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            cache_capacity,
        }
    }

    /// Process-wide registry with the default cache capacity
    pub fn global() -> &'static TokenizerRegistry {
        &GLOBAL
    }

    /// Get the counter for a model, loading it on first use
    pub fn resolve(&self, model: &str) -> Result<Arc<dyn TokenCounter>> {
        let model = model.trim();

        if let Some(counter) = self.counters.read().get(model) {
            return Ok(Arc::clone(counter));
        }

        let loaded = Self::load(model)?;
        let counter: Arc<dyn TokenCounter> = if self.cache_capacity > 0 {
            Arc::new(CachedCounter::new(loaded, self.cache_capacity))
        } else {
            loaded
        };

        // Another thread may have loaded it meanwhile; keep the first one
        let mut counters = self.counters.write();
        let entry = counters
            .entry(model.to_string())
            .or_insert_with(|| Arc::clone(&counter));
        Ok(Arc::clone(entry))
    }

    /// Number of loaded models
    pub fn loaded_count(&self) -> usize {
        self.counters.read().len()
    }

    fn load(model: &str) -> Result<Arc<dyn TokenCounter>> {
        if model.is_empty() {
            return Err(Error::tokenizer(model, "empty model identifier"));
        }

        tracing::info!("Loading tokenizer for model '{}'", model);

        match model {
            "words" | "whitespace" => Ok(Arc::new(WordCounter)),
            "approx" | "chars" => Ok(Arc::new(CharEstimateCounter)),
            _ => {
                if let Some(path) = model.strip_prefix("hf:") {
                    return Self::load_huggingface(model, path);
                }
                Ok(Arc::new(TiktokenCounter::new(model)?))
            }
        }
    }

    #[cfg(feature = "huggingface")]
    fn load_huggingface(_model: &str, path: &str) -> Result<Arc<dyn TokenCounter>> {
        Ok(Arc::new(super::HuggingFaceCounter::from_file(path)?))
    }

    #[cfg(not(feature = "huggingface"))]
    fn load_huggingface(model: &str, _path: &str) -> Result<Arc<dyn TokenCounter>> {
        Err(Error::tokenizer(
            model,
            "HuggingFace tokenizers are not available (built without the `huggingface` feature)",
        ))
    }
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_memoised() {
        let registry = TokenizerRegistry::new(0);

        let first = registry.resolve("words").unwrap();
        let second = registry.resolve(" words ").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.loaded_count(), 1);
    }

    #[test]
    fn test_builtin_models() {
        let registry = TokenizerRegistry::default();

        assert_eq!(registry.resolve("words").unwrap().count_tokens("a b c").unwrap(), 3);
        assert_eq!(registry.resolve("approx").unwrap().count_tokens("abcdefgh").unwrap(), 2);
        assert_eq!(registry.resolve("gpt-4").unwrap().name(), "gpt-4");
    }

    #[test]
    fn test_unknown_model_is_tokenizer_error() {
        let registry = TokenizerRegistry::default();

        assert!(registry.resolve("no-such-model").err().unwrap().is_tokenizer());
        assert!(registry.resolve("").err().unwrap().is_tokenizer());
        assert!(registry.resolve("hf:/missing/tokenizer.json").err().unwrap().is_tokenizer());
        assert_eq!(registry.loaded_count(), 0);
    }
}
