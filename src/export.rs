//! Prism - Preview export
//!
//! Writes the current preview table to CSV or JSON. This is the only report
//! action in the static panel variant.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::info;

use crate::error::PrismError;
use crate::preview::PreviewTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Write `table` to `<dir>/<stem>_preview.<ext>` and return the path.
pub fn export_preview(
    table: &PreviewTable,
    format: ExportFormat,
    dir: &Path,
    stem: &str,
) -> Result<PathBuf, PrismError> {
    if table.is_empty() {
        return Err(PrismError::Export("nothing to export yet".to_string()));
    }

    let stem = if stem.is_empty() { "dataset" } else { stem };
    let path = dir.join(format!("{}_preview.{}", stem, format.extension()));

    match format {
        ExportFormat::Csv => write_csv(table, &path),
        ExportFormat::Json => write_json(table, &path),
    }
    .map_err(|e| PrismError::Export(format!("{}: {}", path.display(), e)))?;

    info!("Exported {} rows to {}", table.rows.len(), path.display());
    Ok(path)
}

fn write_csv(table: &PreviewTable, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.header)?;
    for row in 0..table.rows.len() {
        writer.write_record((0..table.width()).map(|col| table.cell(row, col)))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(table: &PreviewTable, path: &Path) -> anyhow::Result<()> {
    let records: Vec<Value> = (0..table.rows.len())
        .map(|row| {
            let obj: Map<String, Value> = table
                .header
                .iter()
                .enumerate()
                .map(|(col, h)| (h.clone(), Value::String(table.cell(row, col).to_string())))
                .collect();
            Value::Object(obj)
        })
        .collect();

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}
