//! Terminal formatting for chunking results.
//!
//! Tables are padded on plain text first and styled afterwards, so ANSI
//! colors never disturb column alignment.

use console::style;
use ragchunk_core::{BatchSummaryRow, ChunkResult, TextTable};

/// Maximum characters of a chunk shown in previews
const PREVIEW_MAX_LEN: usize = 200;

pub fn print_banner(subtitle: &str) {
    println!("{}", style("ragchunk").bold().blue());
    println!("{}\n", style(subtitle).dim());
}

/// Metric/value table for one result
pub fn format_summary(result: &ChunkResult) -> String {
    let rows = vec![
        vec!["Source".to_string(), result.source().to_string()],
        vec!["Total Chunks".to_string(), format_count(result.total_chunks())],
        vec!["Total Tokens".to_string(), format_count(result.total_tokens())],
        vec!["Total Characters".to_string(), format_count(result.total_chars())],
        vec!["Avg Tokens/Chunk".to_string(), format_count(result.average_tokens())],
    ];

    format!(
        "{}\n{}",
        style("Chunking Results").bold(),
        format_table(&["Metric", "Value"], &rows, &[])
    )
}

/// First `count` chunks, each truncated to a short snippet
pub fn format_preview(result: &ChunkResult, count: usize) -> String {
    let shown = count.min(result.total_chunks());
    let mut out = format!("\n{}\n", style(format!("Preview (first {} chunks):", shown)).bold());

    for chunk in result.chunks().iter().take(shown) {
        out.push_str(&format!(
            "\n{}\n{}\n",
            style(format!("-- Chunk {} ({} tokens) --", chunk.index + 1, chunk.token_count)).dim(),
            truncate_text(&chunk.text, PREVIEW_MAX_LEN)
        ));
    }

    out
}

pub fn format_batch_table(rows: &[BatchSummaryRow]) -> String {
    let table = TextTable::new(["File", "Chunks", "Tokens", "Status"])
        .align_right(&[1, 2])
        .with_rows(
            rows.iter()
                .map(|r| vec![r.file.clone(), r.chunks.to_string(), format_count(r.tokens), r.status.clone()]),
        );
    let mut lines = table.plain_lines().into_iter();

    let mut out = vec![style("Batch Processing Results").bold().to_string()];
    out.extend(lines.next().map(|header| style(header).bold().to_string()));
    out.extend(lines.next());
    for (line, summary) in lines.zip(rows) {
        let styled = if summary.is_success() {
            style(line).green()
        } else {
            style(line).red()
        };
        out.push(styled.to_string());
    }

    out.join("\n")
}

/// Plain aligned table; columns listed in `right` are right-aligned
pub fn format_table(headers: &[&str], rows: &[Vec<String>], right: &[usize]) -> String {
    let table = TextTable::new(headers.iter().copied())
        .align_right(right)
        .with_rows(rows.iter().cloned());
    let mut lines = table.plain_lines();
    if let Some(header) = lines.first_mut() {
        *header = style(header.as_str()).cyan().to_string();
    }
    lines.join("\n")
}

/// `1234567` -> `1,234,567`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// First `max` characters, with `...` when cut
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}
