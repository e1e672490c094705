//! Prism - Source format detection
//!
//! The upload picker accepts CSV and JSON. Anything not named `.json` is
//! read as CSV.

use std::path::Path;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values with a header line
    Csv,
    /// A JSON array of records, or an object with a `data` array
    Json,
}

impl SourceFormat {
    /// Detect format from the file name's extension (case-insensitive)
    pub fn detect<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => SourceFormat::Json,
            _ => SourceFormat::Csv,
        }
    }

    /// Parse format from string (for CLI)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::Json => "JSON",
        }
    }
}
