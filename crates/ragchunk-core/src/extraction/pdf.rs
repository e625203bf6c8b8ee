//! PDF text extraction

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// How long the whole-document fallback may run before it is abandoned
const FALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Typographic characters and ligatures that fonts commonly emit
const REPLACEMENTS: &[(char, &str)] = &[
    ('\0', ""),
    ('\u{00A0}', " "),
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2022}', "* "),
    ('\u{2026}', "..."),
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Extract text page by page as `[Page N]\n<text>` blocks separated by blank lines.
///
/// Pages without text are skipped. A PDF with no extractable text at all
/// (scanned images) yields an empty string.
pub(super) fn extract(data: &[u8]) -> Result<String, String> {
    let doc = lopdf::Document::load_mem(data).map_err(|e| format!("failed to load PDF: {}", e))?;
    let pages = doc.get_pages();

    let mut blocks = Vec::new();
    let mut failed = 0;

    for &page_number in pages.keys() {
        match doc.extract_text(&[page_number]) {
            Ok(text) => {
                let text = cleanup(&text);
                if !text.is_empty() {
                    blocks.push(format!("[Page {}]\n{}", page_number, text));
                }
            }
            Err(e) => {
                tracing::debug!("Could not extract text from page {}: {}", page_number, e);
                failed += 1;
            }
        }
    }

    if failed > 0 && blocks.is_empty() {
        tracing::warn!(
            "Per-page extraction failed on {} of {} pages, trying whole-document fallback",
            failed,
            pages.len()
        );
        return extract_with_fallback(data);
    }

    Ok(blocks.join("\n\n"))
}

/// Whole-document extraction through `pdf-extract`, on a watchdog thread since
/// some fonts make it spin
fn extract_with_fallback(data: &[u8]) -> Result<String, String> {
    let data = data.to_vec();
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let _ = tx.send(pdf_extract::extract_text_from_mem(&data));
    });

    match rx.recv_timeout(FALLBACK_TIMEOUT) {
        Ok(Ok(text)) => {
            let _ = handle.join();
            // Form feeds separate pages in the fallback output
            let blocks: Vec<String> = text
                .split('\u{000C}')
                .map(cleanup)
                .enumerate()
                .filter(|(_, page)| !page.is_empty())
                .map(|(i, page)| format!("[Page {}]\n{}", i + 1, page))
                .collect();
            Ok(blocks.join("\n\n"))
        }
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(format!("PDF text extraction failed: {}", e))
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::error!("PDF extraction timed out after {:?}", FALLBACK_TIMEOUT);
            Err(format!("PDF text extraction timed out after {}s", FALLBACK_TIMEOUT.as_secs()))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err("PDF extraction thread panicked".to_string()),
    }
}

/// Normalise typography and drop blank lines
fn cleanup(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => cleaned.push_str(to),
            None => cleaned.push(c),
        }
    }

    cleaned
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
