//! Dependency-free counters: whitespace words and a character estimate

use super::TokenCounter;
use crate::error::Result;

/// Characters per token used by the estimate
const CHARS_PER_TOKEN: usize = 4;

/// One token per whitespace-separated word
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn name(&self) -> &str {
        "words"
    }

    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(text.split_whitespace().count())
    }

    fn supports_offsets(&self) -> bool {
        true
    }

    fn token_offsets(&self, text: &str) -> Result<Option<Vec<usize>>> {
        let mut offsets = Vec::new();
        let mut in_word = false;

        for (i, c) in text.char_indices() {
            if c.is_whitespace() {
                in_word = false;
            } else if !in_word {
                offsets.push(i);
                in_word = true;
            }
        }

        Ok(Some(offsets))
    }
}

/// Rough estimate of one token per four characters, rounded up
#[derive(Debug, Clone, Copy, Default)]
pub struct CharEstimateCounter;

impl TokenCounter for CharEstimateCounter {
    fn name(&self) -> &str {
        "approx"
    }

    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(text.chars().count().div_ceil(CHARS_PER_TOKEN))
    }

    fn supports_offsets(&self) -> bool {
        true
    }

    fn token_offsets(&self, text: &str) -> Result<Option<Vec<usize>>> {
        Ok(Some(
            text.char_indices()
                .step_by(CHARS_PER_TOKEN)
                .map(|(i, _)| i)
                .collect(),
        ))
    }
}
