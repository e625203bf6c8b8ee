//! Excel and CSV extraction as markdown tables

use calamine::{Data, Reader};
use std::io::Cursor;

use crate::table::TextTable;

/// Every non-empty sheet as `[Sheet: name]` followed by a markdown table,
/// taking the first row as the header
pub(super) fn extract_workbook(data: &[u8]) -> Result<String, String> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data)).map_err(|e| e.to_string())?;

    let mut parts = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let range = match workbook.worksheet_range(&name) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!("Skipping unreadable sheet '{}': {}", name, e);
                continue;
            }
        };

        let grid: Vec<Vec<Option<String>>> = range.rows().map(|row| row.iter().map(cell_text).collect()).collect();

        match sheet_table(grid) {
            Some(table) => parts.push(format!("[Sheet: {}]\n\n{}", name, table)),
            None => tracing::debug!("Sheet '{}' has no data rows", name),
        }
    }

    Ok(parts.join("\n\n"))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(format_number(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.to_string()),
        other => Some(other.to_string()),
    }
}

/// Header row plus data rows, with all-empty rows and columns dropped.
/// `None` when nothing is left.
fn sheet_table(grid: Vec<Vec<Option<String>>>) -> Option<String> {
    let mut rows = grid.into_iter();
    let header = rows.next().filter(|h| !h.is_empty())?;

    let rows: Vec<Vec<Option<String>>> = rows.filter(|row| row.iter().any(Option::is_some)).collect();

    let columns: Vec<usize> = (0..header.len())
        .filter(|&col| rows.iter().any(|row| row.get(col).is_some_and(Option::is_some)))
        .collect();

    if rows.is_empty() || columns.is_empty() {
        return None;
    }

    let headers: Vec<String> = columns
        .iter()
        .map(|&col| header[col].clone().unwrap_or_default())
        .collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|&col| row.get(col).cloned().flatten().unwrap_or_default())
                .collect()
        })
        .collect();

    Some(markdown_table(&headers, &body))
}

/// `[CSV Data]` markdown table, plus `[Statistics]` when numeric columns exist.
///
/// Rows with more fields than the header are skipped; short rows are padded.
pub(super) fn extract_csv(data: &[u8]) -> Result<String, String> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err("no columns to parse".to_string());
    }

    let mut rows = Vec::new();
    let mut skipped = 0;
    for record in reader.records() {
        match record {
            Ok(record) if record.len() <= headers.len() => {
                let mut row: Vec<String> = record.iter().map(|f| f.to_string()).collect();
                row.resize(headers.len(), String::new());
                rows.push(row);
            }
            Ok(_) => skipped += 1,
            Err(e) => {
                tracing::debug!("Skipping malformed CSV row: {}", e);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        tracing::warn!("Skipped {} malformed CSV rows", skipped);
    }

    let mut parts = vec!["[CSV Data]\n".to_string(), markdown_table(&headers, &rows)];

    let numeric: Vec<(String, Vec<f64>)> = (0..headers.len())
        .filter_map(|col| numeric_column(&rows, col).map(|values| (headers[col].clone(), values)))
        .collect();

    if !numeric.is_empty() {
        parts.push("\n\n[Statistics]".to_string());
        parts.push(statistics_table(&numeric));
    }

    Ok(parts.join("\n\n"))
}

/// Parsed values of a column whose non-empty cells are all numbers
fn numeric_column(rows: &[Vec<String>], col: usize) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for row in rows {
        let cell = row[col].trim();
        if cell.is_empty() {
            continue;
        }
        values.push(cell.parse::<f64>().ok()?);
    }
    (!values.is_empty()).then_some(values)
}

const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

fn statistics_table(columns: &[(String, Vec<f64>)]) -> String {
    let described: Vec<[f64; 8]> = columns.iter().map(|(_, values)| describe(values)).collect();

    let mut headers = vec![String::new()];
    headers.extend(columns.iter().map(|(name, _)| name.clone()));

    let rows: Vec<Vec<String>> = STATISTICS
        .iter()
        .enumerate()
        .map(|(i, stat)| {
            let mut row = vec![stat.to_string()];
            row.extend(described.iter().map(|d| format_general(d[i])));
            row
        })
        .collect();

    markdown_table(&headers, &rows)
}

/// count, mean, sample std, min, quartiles (linear interpolation), max
fn describe(values: &[f64]) -> [f64; 8] {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let std = if sorted.len() > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        f64::NAN
    };

    let quantile = |q: f64| {
        let pos = q * (sorted.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    };

    [
        n,
        mean,
        std,
        sorted[0],
        quantile(0.25),
        quantile(0.5),
        quantile(0.75),
        sorted[sorted.len() - 1],
    ]
}

/// Integral floats without a fractional part, others as-is
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Six significant digits, trailing zeros trimmed
fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value == 0.0 || !value.is_finite() {
        return format_number(value);
    }

    let exponent = value.abs().log10().floor() as i32;
    if !(-5..6).contains(&exponent) {
        return format!("{:.5e}", value);
    }

    let decimals = (5 - exponent).max(0) as usize;
    let formatted = format!("{:.*}", decimals, value);
    if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        formatted
    }
}

/// Pipe table with padded columns; numeric columns right-aligned
fn markdown_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let numeric: Vec<usize> = (0..headers.len())
        .filter(|&col| {
            let mut cells = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .peekable();
            cells.peek().is_some() && cells.all(|c| c.parse::<f64>().is_ok())
        })
        .collect();

    TextTable::new(headers.iter().cloned())
        .align_right(&numeric)
        .with_rows(rows.iter().cloned())
        .to_markdown()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_markdown_table_layout() {
        let table = markdown_table(
            &strings(&["Name", "Score"]),
            &[strings(&["Ada", "90"]), strings(&["Bob", "85.5"])],
        );

        assert_eq!(
            table,
            "| Name | Score |\n|:-----|------:|\n| Ada  |    90 |\n| Bob  |  85.5 |"
        );
    }

    #[test]
    fn test_sheet_table_drops_empty_rows_and_columns() {
        let grid = vec![
            vec![cell("Item"), cell("Notes"), cell("Qty")],
            vec![cell("Bolt"), None, cell("12")],
            vec![None, None, None],
            vec![cell("Nut"), None, cell("40")],
        ];

        let table = sheet_table(grid).unwrap();

        assert_eq!(table, "| Item | Qty |\n|:-----|----:|\n| Bolt |  12 |\n| Nut  |  40 |");
    }

    #[test]
    fn test_sheet_table_without_data_is_skipped() {
        assert!(sheet_table(vec![]).is_none());
        assert!(sheet_table(vec![vec![cell("Header")]]).is_none());
        assert!(sheet_table(vec![vec![cell("A")], vec![None]]).is_none());
    }

    #[test]
    fn test_csv_with_statistics() {
        let data = b"name,score,age\nAda,90,36\nBob,85.5,41\nbad,row,with,extra\nCy,,29\n";

        let text = extract_csv(data).unwrap();

        assert!(text.starts_with("[CSV Data]\n\n\n| name"));
        assert!(text.contains("| Ada  |    90 |  36 |"));
        assert!(!text.contains("extra"));
        assert!(text.contains("\n\n\n\n[Statistics]\n\n|       |"));
        assert!(text.contains("| count |       2 |       3 |"));
    }

    #[test]
    fn test_csv_without_numbers_has_no_statistics() {
        let text = extract_csv(b"city,country\nParis,France\nLima,Peru\n").unwrap();

        assert!(text.contains("| Lima  | Peru    |"));
        assert!(!text.contains("[Statistics]"));
    }

    #[test]
    fn test_empty_csv_is_error() {
        assert!(extract_csv(b"").is_err());
    }

    #[test]
    fn test_describe() {
        let stats = describe(&[4.0, 1.0, 3.0, 2.0]);

        assert_eq!(stats[0], 4.0);
        assert_eq!(stats[1], 2.5);
        assert!((stats[2] - 1.290_994).abs() < 1e-6);
        assert_eq!(&stats[3..], &[1.0, 1.75, 2.5, 3.25, 4.0]);
        assert!(describe(&[7.0])[2].is_nan());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_general(1.290_994_448), "1.29099");
        assert_eq!(format_general(2.5), "2.5");
        assert_eq!(format_general(3.0), "3");
        assert_eq!(format_general(f64::NAN), "nan");
        assert_eq!(format_general(0.0), "0");
    }

    #[test]
    fn test_workbook_garbage_is_error() {
        assert!(extract_workbook(b"not a spreadsheet").is_err());
    }
}
