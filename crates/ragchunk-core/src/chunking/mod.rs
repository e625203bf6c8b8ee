//! Token-aware chunking engine

mod engine;
mod search;
mod words;

pub use engine::Chunker;
