use comfy_table::{presets::ASCII_MARKDOWN, Cell, CellAlignment, Table};
use std::fmt;

pub const WER_KEY: &str = "WER (↓)";
pub const QOI_KEY: &str = "QoI (↑)";
pub const FILE_SIZE_KEY: &str = "File Size (MB)";
pub const COMMIT_KEY: &str = "Code Commit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSize {
    Megabytes(u64),
    NotAvailable,
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSize::Megabytes(mb) => write!(f, "{}", mb),
            FileSize::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// One model's line in a comparison table
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub label: String,
    /// Rendered WER cell, usually a link to the eval results
    pub wer: String,
    pub qoi: f64,
    pub file_size: FileSize,
    pub commit: String,
}

/// Rows for one reference model and its optimized variants on one dataset
#[derive(Debug, Clone, Default)]
pub struct ReportTable {
    rows: Vec<ComparisonRow>,
}

impl ReportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the row, or replaces an earlier row carrying the same label
    pub fn upsert(&mut self, row: ComparisonRow) {
        match self.rows.iter_mut().find(|r| r.label == row.label) {
            Some(existing) => *existing = row,
            None => self.rows.push(row),
        }
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn to_markdown(&self) -> String {
        let mut table = Table::new();
        table.load_preset(ASCII_MARKDOWN);
        table.set_header(vec!["", WER_KEY, QOI_KEY, FILE_SIZE_KEY, COMMIT_KEY]);

        for row in &self.rows {
            table.add_row(vec![
                Cell::new(&row.label),
                Cell::new(&row.wer),
                Cell::new(format_qoi(row.qoi)).set_alignment(CellAlignment::Right),
                Cell::new(row.file_size).set_alignment(CellAlignment::Right),
                Cell::new(&row.commit),
            ]);
        }

        table.to_string()
    }
}

/// QoI values carry one decimal at most; whole numbers print without one
pub fn format_qoi(qoi: f64) -> String {
    let rounded = (qoi * 10.).round() / 10.;
    format!("{}", rounded)
}

/// Shortest representation that always keeps a decimal point, e.g. `10.0`, `2.47`
pub fn format_wer(wer: f64) -> String {
    let s = format!("{}", wer);
    if s.contains('.') || !wer.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, qoi: f64, file_size: FileSize) -> ComparisonRow {
        ComparisonRow {
            label: label.to_string(),
            wer: "[2.44](https://hf.co/x)".to_string(),
            qoi,
            file_size,
            commit: "N/A".to_string(),
        }
    }

    #[test]
    fn test_markdown_layout() {
        let mut table = ReportTable::new();
        table.upsert(row("large-v3", 100., FileSize::Megabytes(3100)));
        table.upsert(row("large-v3_947MB", 95.19999999999999, FileSize::Megabytes(947)));
        table.upsert(row("large-v3_turbo", 93.8, FileSize::NotAvailable));

        let markdown = table.to_markdown();
        let lines: Vec<&str> = markdown.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with('|'));
        for key in [WER_KEY, QOI_KEY, FILE_SIZE_KEY, COMMIT_KEY] {
            assert!(lines[0].contains(key));
        }
        assert!(lines[1].starts_with("|-"));
        assert!(lines[2].contains("large-v3 ") && lines[2].contains(" 100 "));
        assert!(lines[3].contains(" 95.2 ") && lines[3].contains(" 947 "));
        assert!(lines[4].contains(" 93.8 ") && lines[4].contains(" N/A "));
    }

    #[test]
    fn test_upsert_replaces_same_label() {
        let mut table = ReportTable::new();
        table.upsert(row("tiny", 100., FileSize::Megabytes(66)));
        table.upsert(row("tiny_turbo", 90., FileSize::NotAvailable));
        table.upsert(row("tiny", 80., FileSize::NotAvailable));

        let labels: Vec<&str> = table.rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["tiny", "tiny_turbo"]);
        assert_eq!(table.rows()[0].qoi, 80.);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_qoi(100.), "100");
        assert_eq!(format_qoi(0.429 * 100.), "42.9");
        assert_eq!(format_wer(10.), "10.0");
        assert_eq!(format_wer(2.47), "2.47");
        assert_eq!(FileSize::NotAvailable.to_string(), "N/A");
    }
}
