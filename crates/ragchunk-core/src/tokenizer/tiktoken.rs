//! OpenAI BPE token counting via tiktoken

use tiktoken_rs::CoreBPE;

use super::TokenCounter;
use crate::error::{Error, Result};

/// Encoding names accepted directly in place of a model name
pub const ENCODING_NAMES: &[&str] = &["cl100k_base", "o200k_base", "p50k_base", "p50k_edit", "r50k_base"];

/// Token counter backed by a tiktoken BPE
pub struct TiktokenCounter {
    model: String,
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Load the BPE for a model name (`gpt-4`, `gpt-4o`, ...) or an encoding
    /// name (`cl100k_base`, ...).
    pub fn new(model: &str) -> Result<Self> {
        let loaded = match model {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "p50k_edit" => tiktoken_rs::p50k_edit(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            _ => tiktoken_rs::get_bpe_from_model(model),
        };

        let bpe = loaded.map_err(|e| Error::tokenizer(model, e.to_string()))?;
        tracing::debug!("Loaded tiktoken encoding for '{}'", model);

        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }
}

impl TokenCounter for TiktokenCounter {
    fn name(&self) -> &str {
        &self.model
    }

    fn count_tokens(&self, text: &str) -> Result<usize> {
        // Document text is data: special-token markup is counted as plain text
        Ok(self.bpe.encode_ordinary(text).len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpt4_counts() {
        let counter = TiktokenCounter::new("gpt-4").unwrap();
        assert_eq!(counter.name(), "gpt-4");
        assert_eq!(counter.count_tokens("").unwrap(), 0);
        assert_eq!(counter.count_tokens("hello world").unwrap(), 2);
        assert!(!counter.supports_offsets());
    }

    #[test]
    fn test_encoding_name() {
        let by_model = TiktokenCounter::new("gpt-4").unwrap();
        let by_encoding = TiktokenCounter::new("cl100k_base").unwrap();
        let text = "Token-aware chunking keeps every chunk under budget.";

        assert_eq!(
            by_model.count_tokens(text).unwrap(),
            by_encoding.count_tokens(text).unwrap()
        );
    }

    #[test]
    fn test_special_tokens_counted_as_text() {
        let counter = TiktokenCounter::new("gpt-4").unwrap();
        assert!(counter.count_tokens("<|endoftext|>").unwrap() > 1);
    }

    #[test]
    fn test_unknown_model() {
        let err = TiktokenCounter::new("definitely-not-a-model").err().unwrap();
        assert!(err.is_tokenizer());
    }
}
