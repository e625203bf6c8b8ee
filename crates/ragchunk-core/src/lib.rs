//! # ragchunk-core
//!
//! Token-aware, word-aligned document chunking for RAG pipelines.
//!
//! Text is split on whitespace and packed greedily into chunks that never
//! exceed a token budget under a chosen tokenizer, with a configurable
//! trailing overlap so neighbouring chunks share context. A single word larger
//! than the budget is emitted alone rather than split.
//!
//! ## Features
//!
//! - **Tokenizers**: tiktoken BPE models (`gpt-4`, `gpt-4o`, `cl100k_base`, ...),
//!   HuggingFace `tokenizer.json` files, and cheap word/character estimates
//! - **Extraction**: PDF, DOCX, XLSX/XLS, CSV, PPTX, plain text and Markdown
//! - **Batch**: parallel processing of whole directories with cancellation
//!
//! ## Example
//!
//! ```no_run
//! use ragchunk_core::{ChunkConfig, Chunker};
//!
//! let chunker = Chunker::new(ChunkConfig::new(500, 50))?;
//! let result = chunker.process("report.pdf")?;
//!
//! for chunk in result.chunks() {
//!     println!("#{} ({} tokens): {}", chunk.index, chunk.token_count, chunk.text);
//! }
//! # Ok::<(), ragchunk_core::Error>(())
//! ```

pub mod batch;
pub mod chunking;
pub mod config;
pub mod error;
pub mod extraction;
pub mod table;
pub mod tokenizer;
pub mod types;

pub use batch::{discover_files, BatchProcessor, BatchReport, BatchSummaryRow, CancellationFlag, OutcomeKind};
pub use chunking::Chunker;
pub use config::{AppConfig, BatchConfig, ChunkConfig, TokenizerConfig};
pub use error::{Error, Result};
pub use extraction::{extract_bytes, load_document, supported_extensions, DocumentFormat};
pub use table::TextTable;
pub use tokenizer::{TokenCounter, TokenizerRegistry};
pub use types::{Chunk, ChunkResult, Document};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
