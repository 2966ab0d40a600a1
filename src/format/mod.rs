//! Output formatting for harvested records (JSON, CSV).

use crate::config::OutputFormat;
use crate::ozon::models::{ProductRecord, FIELDS};

/// Formats records for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the whole collection.
    ///
    /// JSON is an indented array in field order with non-ASCII text kept as
    /// is; an empty collection is `[]`.
    pub fn format_records(&self, records: &[ProductRecord]) -> String {
        match self.format {
            OutputFormat::Json => self.json_records(records),
            OutputFormat::Csv => self.csv_records(records),
        }
    }

    // JSON formatting

    fn json_records(&self, records: &[ProductRecord]) -> String {
        if records.is_empty() {
            return "[]".to_string();
        }
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        FIELDS.join(",")
    }

    fn csv_records(&self, records: &[ProductRecord]) -> String {
        let mut lines = Vec::with_capacity(records.len() + 1);
        lines.push(self.csv_header());

        for record in records {
            let row: Vec<String> = record.values().iter().map(|v| Self::csv_escape(v)).collect();
            lines.push(row.join(","));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
