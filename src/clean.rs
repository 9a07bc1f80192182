//! Cleaning Engine: deduplication, missing-row removal, normalization.
//!
//! Cleaning is the one pipeline stage allowed to rewrite cell
//! representations. It runs three steps in order:
//!
//! 1. drop exact-duplicate rows (first occurrence wins),
//! 2. drop every row containing at least one missing value,
//! 3. rewrite each remaining column — fully numeric-coercible columns
//!    become numbers; all other columns become trimmed, lower-cased text,
//!    and fully date-parseable columns are canonicalized to `YYYY-MM-DD`.
//!
//! The input table is never mutated; the result carries a new [`Table`]
//! plus a [`CleanReport`] with before/after counts and a preview capped at
//! 100 rows.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize::{canonical_date, coerce_numeric_column, parse_date};
use crate::table::{identity_key, Cell, Table};

/// Maximum number of cleaned rows included in the report preview.
pub const PREVIEW_ROWS: usize = 100;

// ── Report ────────────────────────────────────────────────────────────

/// Counts and preview produced by [`clean`].
///
/// Serializes to the exchange shape
/// `{status, original_rows, cleaned_rows, removed_rows, preview}`.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub status: &'static str,
    pub original_rows: usize,
    pub cleaned_rows: usize,
    /// Duplicate and missing-value removals combined.
    pub removed_rows: usize,
    /// First [`PREVIEW_ROWS`] cleaned rows as row-objects, order preserved.
    pub preview: Vec<Map<String, Value>>,
}

/// Outcome of a cleaning pass: the cleaned table and its report.
#[derive(Debug, Clone)]
pub struct CleanResult {
    pub table: Table,
    pub report: CleanReport,
}

// ── Cleaning ──────────────────────────────────────────────────────────

/// Cleans a table.
///
/// A 0-row table yields zero counts and an empty preview; removing every
/// row is a valid outcome, not an error.
///
/// ```
/// use tabric::clean::clean;
/// use tabric::table::{Cell, Table};
///
/// let mut table = Table::new();
/// table.add_column("a".into(), vec![
///     Cell::Number(1.0), Cell::Number(1.0), Cell::Number(2.0),
/// ]).unwrap();
/// table.add_column("b".into(), vec![
///     Cell::Number(2.0), Cell::Number(2.0), Cell::Missing,
/// ]).unwrap();
///
/// let result = clean(&table);
/// assert_eq!(result.report.original_rows, 3);
/// assert_eq!(result.report.removed_rows, 2);
/// assert_eq!(result.report.cleaned_rows, 1);
/// ```
pub fn clean(table: &Table) -> CleanResult {
    let original_rows = table.row_count();

    // Step 1: drop exact duplicates, keeping first occurrences.
    let mut seen = HashSet::with_capacity(original_rows);
    let mut kept: Vec<usize> = Vec::with_capacity(original_rows);
    for row_idx in 0..original_rows {
        if seen.insert(row_fingerprint(table, row_idx)) {
            kept.push(row_idx);
        }
    }

    // Step 2: drop rows with any missing cell.
    kept.retain(|&row_idx| !table.row(row_idx).iter().any(|cell| cell.is_missing()));

    let survivors = table.take_rows(&kept);

    // Step 3: per-column rewrite.
    let columns: Vec<Vec<Cell>> = survivors
        .iter()
        .map(|(_, cells)| rewrite_column(cells))
        .collect();
    let cleaned = survivors.with_columns(columns);

    let cleaned_rows = cleaned.row_count();
    tracing::debug!(
        original_rows,
        cleaned_rows,
        removed_rows = original_rows - cleaned_rows,
        "table cleaned"
    );

    let preview = cleaned.records(PREVIEW_ROWS);
    CleanResult {
        report: CleanReport {
            status: "success",
            original_rows,
            cleaned_rows,
            removed_rows: original_rows - cleaned_rows,
            preview,
        },
        table: cleaned,
    }
}

/// Hash key for exact-duplicate detection over current cell representations.
fn row_fingerprint(table: &Table, row_idx: usize) -> String {
    let mut key = String::new();
    for (i, cell) in table.row(row_idx).iter().enumerate() {
        if i > 0 {
            key.push('\x1F'); // unit separator
        }
        key.push_str(&identity_key(cell));
    }
    key
}

/// Rewrites one column in place for the cleaned table.
fn rewrite_column(cells: &[Cell]) -> Vec<Cell> {
    let numeric = coerce_numeric_column(cells);
    if numeric.excluded == 0 {
        // Fully coercible column becomes numeric-valued. Missing cells are
        // gone after step 2, but map defensively to keep the invariant local.
        return numeric
            .values
            .into_iter()
            .map(|v| v.map(Cell::Number).unwrap_or(Cell::Missing))
            .collect();
    }

    let texts: Vec<String> = cells
        .iter()
        .map(|cell| cell.render().trim().to_lowercase())
        .collect();

    let dates: Option<Vec<_>> = texts.iter().map(|s| parse_date(s)).collect();
    match dates {
        Some(parsed) if !parsed.is_empty() => parsed
            .into_iter()
            .map(|d| Cell::Text(canonical_date(d)))
            .collect(),
        _ => texts.into_iter().map(Cell::Text).collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
