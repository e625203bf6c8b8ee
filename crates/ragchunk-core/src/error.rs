//! Error types for the chunking pipeline

use thiserror::Error;

use crate::extraction::DocumentFormat;

/// Result type alias for chunking operations
pub type Result<T> = std::result::Result<T, Error>;

/// Chunking pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid chunking configuration (rejected before any work starts)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tokenizer model unknown, unavailable or misconfigured
    #[error("Tokenizer error for model '{model}': {message}")]
    Tokenizer { model: String, message: String },

    /// Text extraction failed for a document
    #[error("Failed to extract {format} text from '{source_name}': {message}")]
    Extraction {
        format: DocumentFormat,
        source_name: String,
        message: String,
    },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// A failure while chunking a specific document, with the settings in use
    #[error("Failed to chunk '{source_name}' (max_tokens={max_tokens}, overlap_tokens={overlap_tokens}): {cause}")]
    Document {
        source_name: String,
        max_tokens: usize,
        overlap_tokens: usize,
        #[source]
        cause: Box<Error>,
    },

    /// Batch run was cancelled before this document started
    #[error("Cancelled before processing started")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration file: {0}")]
    ConfigFile(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a tokenizer error
    pub fn tokenizer(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tokenizer {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(
        format: DocumentFormat,
        source_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Extraction {
            format,
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Attach document and configuration context to an error raised mid-chunking
    pub fn in_document(
        self,
        source_name: impl Into<String>,
        max_tokens: usize,
        overlap_tokens: usize,
    ) -> Self {
        Self::Document {
            source_name: source_name.into(),
            max_tokens,
            overlap_tokens,
            cause: Box::new(self),
        }
    }

    /// True for configuration problems, including wrapped ones
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::Config(_) | Error::ConfigFile(_) => true,
            Error::Document { cause, .. } => cause.is_configuration(),
            _ => false,
        }
    }

    /// True for tokenizer problems, including wrapped ones
    pub fn is_tokenizer(&self) -> bool {
        match self {
            Error::Tokenizer { .. } => true,
            Error::Document { cause, .. } => cause.is_tokenizer(),
            _ => false,
        }
    }
}
