//! Plain-text extraction from document files
//!
//! Every extractor turns raw file bytes into one UTF-8 string with light
//! structure markers (`[Page N]`, `[Sheet: name]`, `[Slide N]`, ...) that
//! survive whitespace normalisation in the chunker as ordinary words.

mod office;
mod pdf;
mod spreadsheet;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Document;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Xlsx,
    Xls,
    Csv,
    Pptx,
    Text,
    Markdown,
}

impl DocumentFormat {
    /// Every supported format
    pub const ALL: [DocumentFormat; 8] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::Xlsx,
        DocumentFormat::Xls,
        DocumentFormat::Csv,
        DocumentFormat::Pptx,
        DocumentFormat::Text,
        DocumentFormat::Markdown,
    ];

    /// Detect format from a file extension (without the dot, any case)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            "pptx" => Some(Self::Pptx),
            "txt" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Csv => "csv",
            Self::Pptx => "pptx",
            Self::Text => "txt",
            Self::Markdown => "md",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF documents (per-page text)",
            Self::Docx => "Word documents (paragraphs and tables)",
            Self::Xlsx | Self::Xls => "Excel workbooks (sheets as markdown tables)",
            Self::Csv => "CSV files (markdown table plus statistics)",
            Self::Pptx => "PowerPoint presentations (slides, tables, notes)",
            Self::Text => "Plain text",
            Self::Markdown => "Markdown",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Canonical extensions of all supported formats
pub fn supported_extensions() -> Vec<&'static str> {
    DocumentFormat::ALL.iter().map(|f| f.extension()).collect()
}

/// Read a file and extract its text
///
/// The document's `source_name` is the file name.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !path.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }

    let format = DocumentFormat::from_path(path).ok_or_else(|| {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| "(none)".to_string());
        let supported: Vec<String> = supported_extensions().iter().map(|e| format!(".{}", e)).collect();
        Error::UnsupportedFileType(format!("{} (supported: {})", ext, supported.join(", ")))
    })?;

    let data = std::fs::read(path)?;
    tracing::debug!("Extracting {} ({} bytes) as {}", source_name, data.len(), format);

    let text = extract_bytes(format, &source_name, &data)?;
    Ok(Document::new(text, source_name))
}

/// Extract text from in-memory file contents
pub fn extract_bytes(format: DocumentFormat, source_name: &str, data: &[u8]) -> Result<String> {
    let text = match format {
        DocumentFormat::Pdf => pdf::extract(data),
        DocumentFormat::Docx => office::extract_docx(data),
        DocumentFormat::Pptx => office::extract_pptx(data),
        DocumentFormat::Xlsx | DocumentFormat::Xls => spreadsheet::extract_workbook(data),
        DocumentFormat::Csv => spreadsheet::extract_csv(data),
        DocumentFormat::Text | DocumentFormat::Markdown => Ok(String::from_utf8_lossy(data).into_owned()),
    }
    .map_err(|message| Error::extraction(format, source_name, message))?;

    if text.trim().is_empty() {
        tracing::warn!("No text could be extracted from '{}'", source_name);
    }

    Ok(text)
}
