//! HuggingFace `tokenizer.json` counters

use std::path::Path;
use tokenizers::Tokenizer;

use super::TokenCounter;
use crate::error::{Error, Result};

/// Model identifier prefix selecting a HuggingFace tokenizer file
pub const HF_PREFIX: &str = "hf:";

/// Token counter backed by a HuggingFace tokenizer
///
/// Truncation and padding from the tokenizer file are disabled so counts
/// reflect the whole text. Special tokens are not added.
pub struct HuggingFaceCounter {
    model: String,
    tokenizer: Tokenizer,
}

impl HuggingFaceCounter {
    /// Load a tokenizer from a `tokenizer.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let model = format!("{}{}", HF_PREFIX, path.display());

        let mut tokenizer = Tokenizer::from_file(path)
            .map_err(|e| Error::tokenizer(&model, format!("Failed to load tokenizer: {}", e)))?;
        Self::configure(&model, &mut tokenizer)?;

        tracing::debug!("Loaded HuggingFace tokenizer from {}", path.display());
        Ok(Self { model, tokenizer })
    }

    /// Build from serialized tokenizer JSON bytes
    pub fn from_bytes(name: &str, bytes: impl AsRef<[u8]>) -> Result<Self> {
        let model = format!("{}{}", HF_PREFIX, name);

        let mut tokenizer = Tokenizer::from_bytes(bytes)
            .map_err(|e| Error::tokenizer(&model, format!("Failed to deserialize tokenizer: {}", e)))?;
        Self::configure(&model, &mut tokenizer)?;

        Ok(Self { model, tokenizer })
    }

    fn configure(model: &str, tokenizer: &mut Tokenizer) -> Result<()> {
        tokenizer
            .with_truncation(None)
            .map_err(|e| Error::tokenizer(model, format!("Failed to disable truncation: {}", e)))?;
        tokenizer.with_padding(None);
        Ok(())
    }

    fn encode(&self, text: &str) -> Result<tokenizers::Encoding> {
        self.tokenizer
            .encode(text, false)
            .map_err(|e| Error::tokenizer(&self.model, format!("Encoding failed: {}", e)))
    }
}

impl TokenCounter for HuggingFaceCounter {
    fn name(&self) -> &str {
        &self.model
    }

    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text)?.len())
    }

    fn supports_offsets(&self) -> bool {
        true
    }

    fn token_offsets(&self, text: &str) -> Result<Option<Vec<usize>>> {
        let encoding = self.encode(text)?;
        Ok(Some(encoding.get_offsets().iter().map(|&(start, _)| start).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Word-level tokenizer: whitespace pre-tokenizer, unknown words map to [UNK]
    const WORD_LEVEL_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": { "[UNK]": 0, "hello": 1, "world": 2, ".": 3 },
            "unk_token": "[UNK]"
        }
    }"#;

    #[test]
    fn test_counts_and_offsets() {
        let counter = HuggingFaceCounter::from_bytes("word-level", WORD_LEVEL_JSON).unwrap();

        assert_eq!(counter.name(), "hf:word-level");
        assert_eq!(counter.count_tokens("hello world.").unwrap(), 3);
        assert_eq!(
            counter.token_offsets("hello  world").unwrap(),
            Some(vec![0, 7])
        );
    }

    #[test]
    fn test_missing_file() {
        let err = HuggingFaceCounter::from_file("/nonexistent/tokenizer.json").err().unwrap();
        assert!(err.is_tokenizer());
        assert!(err.to_string().contains("hf:/nonexistent/tokenizer.json"));
    }
}
