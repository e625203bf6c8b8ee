//! Padded text tables
//!
//! Shared by the spreadsheet extractors (markdown pipe tables) and terminal
//! output (plain aligned columns).

/// Column alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

/// A header row and body rows, padded to common column widths on render.
///
/// Line breaks inside cells become spaces so every row stays on one line.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    align: Vec<Align>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(|h| single_line(h.into())).collect();
        let align = vec![Align::Left; headers.len()];
        Self {
            headers,
            rows: Vec::new(),
            align,
        }
    }

    /// Append a row; short rows are padded with empty cells, extra cells dropped
    pub fn push_row(&mut self, row: Vec<String>) {
        let mut row: Vec<String> = row.into_iter().map(single_line).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn with_rows<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        for row in rows {
            self.push_row(row);
        }
        self
    }

    /// Right-align the given columns; out-of-range indices are ignored
    pub fn align_right(mut self, columns: &[usize]) -> Self {
        for &col in columns {
            if let Some(align) = self.align.get_mut(col) {
                *align = Align::Right;
            }
        }
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Widest cell per column, header included, in characters
    pub fn widths(&self) -> Vec<usize> {
        (0..self.headers.len())
            .map(|col| {
                self.rows
                    .iter()
                    .map(|row| row[col].chars().count())
                    .chain(std::iter::once(self.headers[col].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Header, dash separator, then one line per row. Columns are two spaces
    /// apart and trailing padding is trimmed.
    pub fn plain_lines(&self) -> Vec<String> {
        let widths = self.widths();
        let line = |cells: &[String]| self.pad(cells, &widths).join("  ").trim_end().to_string();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(line(self.headers.as_slice()));
        lines.push(widths.iter().map(|&w| "-".repeat(w)).collect::<Vec<_>>().join("  "));
        lines.extend(self.rows.iter().map(|row| line(row.as_slice())));
        lines
    }

    /// Pipe table with `:--` / `--:` alignment markers
    pub fn to_markdown(&self) -> String {
        let widths = self.widths();
        let line = |cells: &[String]| format!("| {} |", self.pad(cells, &widths).join(" | "));

        let markers: Vec<String> = widths
            .iter()
            .zip(&self.align)
            .map(|(&width, align)| {
                let dashes = "-".repeat(width + 1);
                match align {
                    Align::Left => format!(":{}", dashes),
                    Align::Right => format!("{}:", dashes),
                }
            })
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(line(self.headers.as_slice()));
        lines.push(format!("|{}|", markers.join("|")));
        lines.extend(self.rows.iter().map(|row| line(row.as_slice())));
        lines.join("\n")
    }

    fn pad(&self, cells: &[String], widths: &[usize]) -> Vec<String> {
        cells
            .iter()
            .zip(widths)
            .zip(&self.align)
            .map(|((cell, &width), align)| match align {
                Align::Left => format!("{:<width$}", cell),
                Align::Right => format!("{:>width$}", cell),
            })
            .collect()
    }
}

fn single_line(cell: String) -> String {
    if cell.contains(['\r', '\n']) {
        cell.replace(['\r', '\n'], " ")
    } else {
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_plain_lines() {
        let table = TextTable::new(["File", "Chunks"])
            .align_right(&[1])
            .with_rows([row(&["a.pdf", "12"]), row(&["longer.docx", "3"])]);

        assert_eq!(
            table.plain_lines(),
            vec!["File         Chunks", "-----------  ------", "a.pdf            12", "longer.docx       3"]
        );
    }

    #[test]
    fn test_markdown() {
        let table = TextTable::new(["name", "n"])
            .align_right(&[1])
            .with_rows([row(&["alpha", "1"]), row(&["b", "10"])]);

        assert_eq!(
            table.to_markdown(),
            "| name  |  n |\n|:------|---:|\n| alpha |  1 |\n| b     | 10 |"
        );
    }

    #[test]
    fn test_rows_normalised() {
        let mut table = TextTable::new(["a", "b"]).align_right(&[7]);
        table.push_row(row(&["x"]));
        table.push_row(row(&["line\nbreak", "y", "dropped"]));

        assert_eq!(table.rows()[0], row(&["x", ""]));
        assert_eq!(table.rows()[1], row(&["line break", "y"]));
        assert_eq!(table.widths(), vec![10, 1]);
    }
}
