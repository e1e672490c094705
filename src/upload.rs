//! Prism - Upload surface
//!
//! Orchestrates file selection, parsing and classification, and holds what
//! the UI renders: file name, preview table, meta summary and error text.
//!
//! ```text
//!   Idle ──select──▶ FileSelected ──ok──▶ Parsed
//!    ▲                    │                 │
//!    │                    └──err──▶ Error   │
//!    └────────clear────────────────┴────────┘
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::classify::{classify_columns, ColumnType};
use crate::clean::{self, CleanOp, CleanReport};
use crate::config;
use crate::error::PrismError;
use crate::format::SourceFormat;
use crate::preview::{self, PreviewTable};

/// Quality label shown until real profiling exists
pub const PLACEHOLDER_QUALITY: &str = "Good";

/// Upload lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    FileSelected,
    Parsed,
    Error,
}

/// Derived summary of the parsed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    /// Every data row in the source, not just the previewed ones
    pub rows_count: usize,
    pub cols_count: usize,
    pub types: Vec<ColumnType>,
    pub quality: &'static str,
}

/// A file read into memory for a single parse.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub content: String,
}

impl RawFile {
    /// Read a file as text, refusing anything over `limit` bytes.
    ///
    /// Invalid UTF-8 is replaced rather than rejected and a leading BOM is
    /// dropped.
    pub fn read<P: AsRef<Path>>(path: P, limit: u64) -> Result<Self, PrismError> {
        let path = path.as_ref();
        let name = display_name(path);

        let file = File::open(path)
            .map_err(|e| PrismError::FileRead(format!("{}: {}", path.display(), e)))?;
        let size = file.metadata()?.len();
        if size > limit {
            return Err(PrismError::FileRead(format!(
                "{} is {} bytes, larger than the {} byte limit",
                name, size, limit
            )));
        }

        let mut bytes = Vec::with_capacity(size as usize);
        file.take(limit + 1).read_to_end(&mut bytes)?;
        if bytes.len() as u64 > limit {
            return Err(PrismError::FileRead(format!(
                "{} grew past the {} byte limit while reading",
                name, limit
            )));
        }

        let text = String::from_utf8_lossy(&bytes);
        let content = text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string();

        Ok(Self { name, content })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Upload state plus everything derived from the current file.
pub struct UploadSurface {
    state: UploadState,
    file_name: String,
    format: Option<SourceFormat>,
    preview: PreviewTable,
    meta: Option<Meta>,
    error: String,
    max_file_bytes: u64,
}

impl Default for UploadSurface {
    fn default() -> Self {
        Self::new(config::get().max_file_bytes)
    }
}

impl UploadSurface {
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            state: UploadState::Idle,
            file_name: String::new(),
            format: None,
            preview: PreviewTable::default(),
            meta: None,
            error: String::new(),
            max_file_bytes,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> Option<SourceFormat> {
        self.format
    }

    pub fn preview(&self) -> &PreviewTable {
        &self.preview
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// Error text; empty when there is none.
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Read and parse a file from disk. The format comes from the file name
    /// unless `format` overrides it.
    pub fn select_file<P: AsRef<Path>>(&mut self, path: P, format: Option<SourceFormat>) {
        let path = path.as_ref();
        self.begin(display_name(path));

        match RawFile::read(path, self.max_file_bytes) {
            Ok(raw) => {
                let format = format.unwrap_or_else(|| SourceFormat::detect(&raw.name));
                self.parse_into(&raw.content, format);
            }
            Err(e) => self.fail(e),
        }
    }

    /// Parse text that is already in memory, detecting the format from `name`.
    pub fn load_text(&mut self, name: &str, text: &str) {
        self.load_text_as(name, text, SourceFormat::detect(name));
    }

    pub fn load_text_as(&mut self, name: &str, text: &str, format: SourceFormat) {
        self.begin(name.to_string());
        self.parse_into(text, format);
    }

    /// Back to `Idle` with every derived value reset.
    pub fn clear(&mut self) {
        self.state = UploadState::Idle;
        self.file_name.clear();
        self.format = None;
        self.preview = PreviewTable::default();
        self.meta = None;
        self.error.clear();
    }

    /// Apply a cleaning operation to the preview. Only meaningful once parsed.
    pub fn clean(&mut self, op: CleanOp) -> Option<CleanReport> {
        if self.state != UploadState::Parsed {
            return None;
        }
        let meta = self.meta.as_mut()?;

        let report = clean::apply(&mut self.preview, &meta.types, op);
        meta.rows_count = meta.rows_count.saturating_sub(report.rows_removed);
        meta.types = classify_columns(&self.preview);

        info!("{}: {}", self.file_name, report.summary());
        Some(report)
    }

    fn begin(&mut self, name: String) {
        self.clear();
        self.state = UploadState::FileSelected;
        self.file_name = name;
    }

    fn parse_into(&mut self, text: &str, format: SourceFormat) {
        self.format = Some(format);

        match preview::parse(text, format) {
            Ok(parsed) => {
                let types = classify_columns(&parsed.table);
                info!(
                    "Parsed {} as {}: {} rows, {} columns",
                    self.file_name,
                    format.label(),
                    parsed.total_rows,
                    parsed.table.width()
                );
                self.meta = Some(Meta {
                    rows_count: parsed.total_rows,
                    cols_count: parsed.table.width(),
                    types,
                    quality: PLACEHOLDER_QUALITY,
                });
                self.preview = parsed.table;
                self.state = UploadState::Parsed;
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, e: PrismError) {
        warn!("Upload of {} failed: {}", self.file_name, e);
        self.preview = PreviewTable::default();
        self.meta = None;
        self.error = e.to_string();
        self.state = UploadState::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::MissingStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_upload_scenario() {
        let mut upload = UploadSurface::new(1024);
        upload.load_text("sales.csv", "a,b\n1,x\n2,y\n3,z");

        assert_eq!(upload.state(), UploadState::Parsed);
        assert_eq!(upload.file_name(), "sales.csv");
        assert_eq!(upload.preview().header, vec!["a", "b"]);
        assert_eq!(upload.preview().rows.len(), 3);

        let meta = upload.meta().expect("meta after parse");
        assert_eq!(meta.rows_count, 3);
        assert_eq!(meta.cols_count, 2);
        assert_eq!(meta.types, vec![ColumnType::Numeric, ColumnType::Categorical]);
        assert_eq!(meta.quality, "Good");
        assert!(upload.error().is_empty());
    }

    #[test]
    fn test_malformed_json_keeps_preview_empty() {
        let mut upload = UploadSurface::new(1024);
        upload.load_text("broken.json", "{\"data\": [");

        assert_eq!(upload.state(), UploadState::Error);
        assert!(!upload.error().is_empty());
        assert!(upload.preview().is_empty());
        assert!(upload.meta().is_none());
    }

    #[test]
    fn test_new_selection_discards_previous_preview() {
        let mut upload = UploadSurface::new(1024);
        upload.load_text("good.csv", "a\n1");
        upload.load_text("bad.json", "[]");

        assert_eq!(upload.state(), UploadState::Error);
        assert_eq!(upload.file_name(), "bad.json");
        assert_eq!(upload.error(), "No records found");
        assert!(upload.preview().is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut upload = UploadSurface::new(1024);
        upload.load_text("good.csv", "a,b\n1,2");
        upload.clear();

        assert_eq!(upload.state(), UploadState::Idle);
        assert_eq!(upload.file_name(), "");
        assert!(upload.preview().is_empty());
        assert!(upload.meta().is_none());
        assert_eq!(upload.error(), "");

        // Same file again after clearing parses from scratch
        upload.load_text("good.csv", "a,b\n1,2");
        assert_eq!(upload.state(), UploadState::Parsed);
        assert_eq!(upload.meta().map(|m| m.rows_count), Some(1));
    }

    #[test]
    fn test_select_file_from_disk() -> anyhow::Result<()> {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        write!(file, "\u{feff}[{{\"id\": 1, \"when\": \"2024-01-01\"}}]")?;

        let mut upload = UploadSurface::new(1024);
        upload.select_file(file.path(), None);

        assert_eq!(upload.state(), UploadState::Parsed);
        assert_eq!(upload.format(), Some(SourceFormat::Json));
        assert_eq!(upload.preview().header, vec!["id", "when"]);
        assert_eq!(
            upload.meta().map(|m| m.types.clone()),
            Some(vec![ColumnType::Numeric, ColumnType::Datetime])
        );
        Ok(())
    }

    #[test]
    fn test_format_override() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "[{{\"k\": \"v\"}}]")?;

        let mut upload = UploadSurface::new(1024);
        upload.select_file(file.path(), Some(SourceFormat::Json));
        assert_eq!(upload.preview().header, vec!["k"]);
        Ok(())
    }

    #[test]
    fn test_oversized_and_missing_files_are_read_errors() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "a,b")?;
        writeln!(file, "1,2")?;

        let mut upload = UploadSurface::new(4);
        upload.select_file(file.path(), None);
        assert_eq!(upload.state(), UploadState::Error);
        assert!(upload.error().starts_with("Failed to read file"));

        upload.select_file("/definitely/not/here.csv", None);
        assert_eq!(upload.state(), UploadState::Error);
        assert_eq!(upload.file_name(), "here.csv");
        Ok(())
    }

    #[test]
    fn test_clean_adjusts_meta() {
        let mut upload = UploadSurface::new(1024);
        assert!(upload.clean(CleanOp::RemoveDuplicates).is_none());

        upload.load_text("d.csv", "a,b\n1,x\n1,x\n,y");
        let report = upload
            .clean(CleanOp::Missing(MissingStrategy::Drop))
            .expect("parsed");
        assert_eq!(report.rows_removed, 1);
        assert_eq!(upload.meta().map(|m| m.rows_count), Some(2));

        let report = upload.clean(CleanOp::RemoveDuplicates).expect("parsed");
        assert_eq!(report.rows_removed, 1);
        assert_eq!(upload.preview().rows, vec![vec!["1", "x"]]);
    }
}
