//! Prism - Tabular preview parser
//!
//! Turns raw uploaded text into a bounded rectangular preview: a header and
//! at most [`PREVIEW_ROW_LIMIT`] data rows, plus the full row count.
//!
//! CSV splitting is deliberately naive (no quoted fields), matching what the
//! upload picker promises. JSON accepts a top-level record array or an
//! object with a `data` array.

use serde::Serialize;
use serde_json::Value;

use crate::error::PrismError;
use crate::format::SourceFormat;

/// Maximum number of data rows kept in a preview
pub const PREVIEW_ROW_LIMIT: usize = 100;

/// Header plus a bounded sample of rows. Rows may be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PreviewTable {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Cell text, or `""` when the row is too short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All cells of one column in row order; short rows yield `""`.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |r| r.get(col).map(String::as_str).unwrap_or(""))
    }
}

/// Parser output: the preview and the count of every data row in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPreview {
    pub table: PreviewTable,
    pub total_rows: usize,
}

/// Parse raw text in the given format.
pub fn parse(text: &str, format: SourceFormat) -> Result<ParsedPreview, PrismError> {
    match format {
        SourceFormat::Csv => parse_csv(text),
        SourceFormat::Json => parse_json(text),
    }
}

/// Naive CSV: blank lines dropped, first line is the header, every line is
/// split on commas with quote characters kept literally. Lines end at `\n`
/// with an optional `\r` before it; a lone `\r` is ordinary text.
pub fn parse_csv(text: &str) -> Result<ParsedPreview, PrismError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());

    let mut lines = reader.records().filter_map(|record| match record {
        Ok(record) => line_fields(&record).map(Ok),
        Err(e) => Some(Err(PrismError::from(e))),
    });

    let header = match lines.next() {
        Some(fields) => fields?,
        None => {
            return Ok(ParsedPreview {
                table: PreviewTable::default(),
                total_rows: 0,
            })
        }
    };

    let mut rows = Vec::new();
    let mut total_rows = 0;

    for fields in lines {
        let fields = fields?;
        if rows.len() < PREVIEW_ROW_LIMIT {
            rows.push(fields);
        }
        total_rows += 1;
    }

    Ok(ParsedPreview {
        table: PreviewTable { header, rows },
        total_rows,
    })
}

/// Fields of one line with the `\r` of a CRLF ending removed. `None` for
/// blank lines.
fn line_fields(record: &csv::StringRecord) -> Option<Vec<String>> {
    let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
    if let Some(last) = fields.last_mut() {
        if last.ends_with('\r') {
            last.pop();
        }
    }
    if fields.len() <= 1 && fields.first().map_or(true, |f| f.is_empty()) {
        return None;
    }
    Some(fields)
}

/// JSON records: header from the first record's keys (source order), values
/// coerced to display strings.
pub fn parse_json(text: &str) -> Result<ParsedPreview, PrismError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| PrismError::Parse(format!("Invalid JSON: {}", e)))?;

    let records = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let first = records
        .first()
        .ok_or_else(|| PrismError::Parse("No records found".to_string()))?;

    let header: Vec<String> = match first {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => {
            return Err(PrismError::Parse(
                "First record is not an object".to_string(),
            ))
        }
    };

    let rows = records
        .iter()
        .take(PREVIEW_ROW_LIMIT)
        .map(|record| header.iter().map(|h| cell_text(record.get(h))).collect())
        .collect();

    Ok(ParsedPreview {
        total_rows: records.len(),
        table: PreviewTable { header, rows },
    })
}

/// Display text for one JSON value. Missing and `null` render empty.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        // Integral floats print without the fraction, like other number text
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if n.is_f64() => v.to_string(),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}
