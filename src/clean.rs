//! Prism - Preview cleaning operations
//!
//! Missing-value handling, duplicate removal and IQR outlier detection over
//! the preview table. A cell is missing when the row is too short for it or
//! its text is blank.

use std::collections::{HashMap, HashSet};

use crate::classify::{parse_numeric, ColumnType};
use crate::preview::PreviewTable;

/// How missing cells are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingStrategy {
    /// Remove rows with any missing cell
    Drop,
    /// Fill numeric columns with the column mean
    Mean,
    /// Fill numeric columns with the column median
    Median,
    /// Fill every column with its most frequent value
    Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanOp {
    Missing(MissingStrategy),
    RemoveDuplicates,
    /// Report-only; the table is left untouched
    IqrOutliers,
}

impl CleanOp {
    pub fn label(&self) -> &'static str {
        match self {
            CleanOp::Missing(MissingStrategy::Drop) => "Drop missing",
            CleanOp::Missing(MissingStrategy::Mean) => "Fill mean",
            CleanOp::Missing(MissingStrategy::Median) => "Fill median",
            CleanOp::Missing(MissingStrategy::Mode) => "Fill mode",
            CleanOp::RemoveDuplicates => "Remove duplicates",
            CleanOp::IqrOutliers => "IQR outliers",
        }
    }
}

/// What a cleaning operation changed or found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub op: Option<CleanOp>,
    pub rows_removed: usize,
    pub cells_filled: usize,
    /// (column, outlier count) for numeric columns with at least one outlier
    pub outliers: Vec<(String, usize)>,
}

impl CleanReport {
    pub fn summary(&self) -> String {
        let label = self.op.map(|op| op.label()).unwrap_or("Clean");
        match self.op {
            Some(CleanOp::IqrOutliers) if self.outliers.is_empty() => {
                format!("{}: no outliers found", label)
            }
            Some(CleanOp::IqrOutliers) => {
                let parts: Vec<String> = self
                    .outliers
                    .iter()
                    .map(|(col, n)| format!("{} ({})", col, n))
                    .collect();
                format!("{}: {}", label, parts.join(", "))
            }
            _ => format!(
                "{}: {} rows removed, {} cells filled",
                label, self.rows_removed, self.cells_filled
            ),
        }
    }
}

/// Apply `op` to the table. `types` holds the column labels from the
/// classifier, used to pick the numeric columns.
pub fn apply(table: &mut PreviewTable, types: &[ColumnType], op: CleanOp) -> CleanReport {
    let mut report = match op {
        CleanOp::Missing(MissingStrategy::Drop) => drop_missing(table),
        CleanOp::Missing(MissingStrategy::Mean) => fill_numeric(table, types, mean),
        CleanOp::Missing(MissingStrategy::Median) => fill_numeric(table, types, median),
        CleanOp::Missing(MissingStrategy::Mode) => fill_mode(table),
        CleanOp::RemoveDuplicates => remove_duplicates(table),
        CleanOp::IqrOutliers => iqr_outliers(table, types),
    };
    report.op = Some(op);
    report
}

fn is_missing(table: &PreviewTable, row: usize, col: usize) -> bool {
    table.cell(row, col).trim().is_empty()
}

fn drop_missing(table: &mut PreviewTable) -> CleanReport {
    let width = table.width();
    let before = table.rows.len();
    table.rows.retain(|row| {
        (0..width).all(|col| row.get(col).is_some_and(|v| !v.trim().is_empty()))
    });
    CleanReport {
        rows_removed: before - table.rows.len(),
        ..Default::default()
    }
}

fn fill_numeric(
    table: &mut PreviewTable,
    types: &[ColumnType],
    stat: fn(&mut [f64]) -> Option<f64>,
) -> CleanReport {
    let mut report = CleanReport::default();

    for (col, ty) in types.iter().enumerate().take(table.width()) {
        if *ty != ColumnType::Numeric {
            continue;
        }
        let mut values = numeric_values(table, col);
        if let Some(fill) = stat(&mut values) {
            report.cells_filled += fill_column(table, col, &format_number(fill));
        }
    }
    report
}

fn fill_mode(table: &mut PreviewTable) -> CleanReport {
    let mut report = CleanReport::default();

    for col in 0..table.width() {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (i, v) in table.column(col).enumerate() {
            if !v.trim().is_empty() {
                counts.entry(v).or_insert((0, i)).0 += 1;
            }
        }
        // Highest count wins; ties go to the value seen first
        let mode = counts
            .into_iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
            .map(|(v, _)| v.to_string());

        if let Some(mode) = mode {
            report.cells_filled += fill_column(table, col, &mode);
        }
    }
    report
}

fn fill_column(table: &mut PreviewTable, col: usize, value: &str) -> usize {
    let mut filled = 0;
    for row in 0..table.rows.len() {
        if is_missing(table, row, col) {
            let cells = &mut table.rows[row];
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = value.to_string();
            filled += 1;
        }
    }
    filled
}

fn remove_duplicates(table: &mut PreviewTable) -> CleanReport {
    let before = table.rows.len();
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
    table.rows.retain(|row| seen.insert(row.clone()));
    CleanReport {
        rows_removed: before - table.rows.len(),
        ..Default::default()
    }
}

fn iqr_outliers(table: &PreviewTable, types: &[ColumnType]) -> CleanReport {
    let mut report = CleanReport::default();

    for (col, ty) in types.iter().enumerate().take(table.width()) {
        if *ty != ColumnType::Numeric {
            continue;
        }
        let mut values = numeric_values(table, col);
        values.sort_by(f64::total_cmp);
        let (Some(q1), Some(q3)) = (quantile(&values, 0.25), quantile(&values, 0.75)) else {
            continue;
        };
        let iqr = q3 - q1;
        let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
        let count = values.iter().filter(|v| **v < lo || **v > hi).count();
        if count > 0 {
            report.outliers.push((table.header[col].clone(), count));
        }
    }
    report
}

// ─── Statistics ─────────────────────────────────────────────────────────────

fn numeric_values(table: &PreviewTable, col: usize) -> Vec<f64> {
    table
        .column(col)
        .filter_map(parse_numeric)
        .filter(|v| v.is_finite())
        .collect()
}

fn mean(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &mut [f64]) -> Option<f64> {
    values.sort_by(f64::total_cmp);
    quantile(values, 0.5)
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Integral values print without a fraction; others keep at most four
/// decimals.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &[&str], rows: &[&[&str]]) -> PreviewTable {
        PreviewTable {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_drop_missing() {
        let mut t = table(&["a", "b"], &[&["1", "x"], &["", "y"], &["3"], &["4", " "], &["5", "z"]]);
        let report = apply(&mut t, &[], CleanOp::Missing(MissingStrategy::Drop));
        assert_eq!(report.rows_removed, 3);
        assert_eq!(t.rows.len(), 2);
    }

    #[test]
    fn test_fill_mean_and_median() {
        let types = [ColumnType::Numeric, ColumnType::Categorical];
        let mut t = table(&["n", "c"], &[&["1", "a"], &["2", ""], &["", "b"], &["9"]]);
        let report = apply(&mut t, &types, CleanOp::Missing(MissingStrategy::Mean));
        assert_eq!(report.cells_filled, 1);
        assert_eq!(t.cell(2, 0), "4");
        // Categorical column untouched
        assert_eq!(t.cell(1, 1), "");

        let mut t = table(&["n"], &[&["1"], &["2"], &["10"], &["4"], &[""]]);
        apply(&mut t, &[ColumnType::Numeric], CleanOp::Missing(MissingStrategy::Median));
        assert_eq!(t.cell(4, 0), "3");
    }

    #[test]
    fn test_fill_mode_prefers_first_seen_on_tie() {
        let mut t = table(&["c"], &[&["b"], &["a"], &["a"], &["b"], &[""]]);
        let report = apply(&mut t, &[ColumnType::Categorical], CleanOp::Missing(MissingStrategy::Mode));
        assert_eq!(report.cells_filled, 1);
        assert_eq!(t.cell(4, 0), "b");
    }

    #[test]
    fn test_fill_pads_short_rows() {
        let mut t = table(&["a", "b"], &[&["1", "x"], &["2"], &["3", "x"]]);
        apply(&mut t, &[ColumnType::Numeric, ColumnType::Categorical], CleanOp::Missing(MissingStrategy::Mode));
        assert_eq!(t.rows[1], vec!["2", "x"]);
    }

    #[test]
    fn test_remove_duplicates_keeps_first() {
        let mut t = table(&["a"], &[&["1"], &["2"], &["1"], &["3"], &["2"]]);
        let report = apply(&mut t, &[], CleanOp::RemoveDuplicates);
        assert_eq!(report.rows_removed, 2);
        assert_eq!(t.rows, vec![vec!["1"], vec!["2"], vec!["3"]]);
    }

    #[test]
    fn test_iqr_outliers_report_only() {
        let types = [ColumnType::Numeric, ColumnType::Numeric];
        let mut t = table(
            &["x", "y"],
            &[&["1", "1"], &["2", "2"], &["3", "3"], &["4", "4"], &["100", "5"]],
        );
        let before = t.clone();
        let report = apply(&mut t, &types, CleanOp::IqrOutliers);
        assert_eq!(report.outliers, vec![("x".to_string(), 1)]);
        assert_eq!(t, before);
        assert_eq!(report.summary(), "IQR outliers: x (1)");
    }

    #[test]
    fn test_quantile_and_format() {
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5), Some(2.5));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333");
    }
}
