//! Table Import Adapter: raw bytes in a declared format → [`Table`].
//!
//! Covers the text formats of the upload menu: CSV, TSV (`.txt` uploads
//! are tab-separated), and JSON arrays of objects. Decoding is the only
//! job here — cells arrive untyped (`Text`/`Number`/`Bool`/`Missing`) and
//! semantic typing happens later in [`normalize`](crate::normalize).
//!
//! CSV/TSV cells matching a null marker (empty, `na`, `n/a`, `null`,
//! `nan`, case-insensitive) become [`Cell::Missing`]; everything else
//! stays text.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde_json::Value;

use crate::error::EngineError;
use crate::table::{Cell, Table};

/// Cell values treated as missing during CSV/TSV decoding.
const NULL_MARKERS: &[&str] = &["", "na", "n/a", "null", "nan"];

// ── TableFormat ───────────────────────────────────────────────────────

/// Declared input format, keyed on the upload's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    /// Tab-separated; `.txt` uploads are read this way.
    Tsv,
    Json,
}

impl std::str::FromStr for TableFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "txt" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            other => Err(EngineError::UnsupportedFormat {
                value: other.to_string(),
            }),
        }
    }
}

// ── Import ────────────────────────────────────────────────────────────

/// Decodes `input` as `format` into a fresh table.
///
/// ```
/// use tabric::import::{import_str, TableFormat};
///
/// let table = import_str("name,score\nada,90\nalan,\n", TableFormat::Csv).unwrap();
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.column_names(), &["name", "score"]);
/// ```
pub fn import_str(input: &str, format: TableFormat) -> Result<Table, EngineError> {
    let table = match format {
        TableFormat::Csv => import_delimited(input, b','),
        TableFormat::Tsv => import_delimited(input, b'\t'),
        TableFormat::Json => import_json(input),
    }?;
    tracing::debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        ?format,
        "table imported"
    );
    Ok(table)
}

/// Reads a file and decodes it; the format comes from the extension.
pub fn import_path(path: &Path) -> Result<Table, EngineError> {
    let format: TableFormat = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .parse()?;
    let input = std::fs::read_to_string(path)?;
    import_str(&input, format)
}

fn import_delimited(input: &str, delimiter: u8) -> Result<Table, EngineError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(input.as_bytes());

    let names: Vec<String> = reader
        .headers()
        .map_err(|e| EngineError::Import {
            message: format!("failed to read headers: {e}"),
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| EngineError::Import {
            message: format!("failed to parse record {}: {e}", line + 1),
        })?;
        for (col_idx, column) in columns.iter_mut().enumerate() {
            let raw = record.get(col_idx).unwrap_or("");
            column.push(decode_field(raw));
        }
    }

    build_table(names, columns)
}

fn decode_field(raw: &str) -> Cell {
    let lowered = raw.to_ascii_lowercase();
    if NULL_MARKERS.iter().any(|m| *m == lowered) {
        Cell::Missing
    } else {
        Cell::Text(raw.to_string())
    }
}

fn import_json(input: &str) -> Result<Table, EngineError> {
    let value: Value = serde_json::from_str(input).map_err(|e| EngineError::Import {
        message: format!("invalid JSON: {e}"),
    })?;
    let Value::Array(records) = value else {
        return Err(EngineError::Import {
            message: "expected a JSON array of objects".to_string(),
        });
    };

    // Column order is first-seen across records; keys absent from a
    // record backfill as missing.
    let mut names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<Cell>> = Vec::new();
    for (row_idx, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(EngineError::Import {
                message: format!("record {} is not an object", row_idx + 1),
            });
        };
        for (key, field) in fields {
            let col_idx = match names.iter().position(|n| n == key) {
                Some(idx) => idx,
                None => {
                    names.push(key.clone());
                    columns.push(vec![Cell::Missing; row_idx]);
                    columns.len() - 1
                }
            };
            columns[col_idx].push(decode_json_value(field, row_idx)?);
        }
        for column in &mut columns {
            if column.len() == row_idx {
                column.push(Cell::Missing);
            }
        }
    }

    build_table(names, columns)
}

fn decode_json_value(value: &Value, row_idx: usize) -> Result<Cell, EngineError> {
    match value {
        Value::Null => Ok(Cell::Missing),
        Value::Bool(b) => Ok(Cell::Bool(*b)),
        Value::Number(n) => Ok(n
            .as_f64()
            .map(Cell::Number)
            .unwrap_or(Cell::Missing)),
        Value::String(s) => Ok(Cell::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(EngineError::Import {
            message: format!("record {} contains a nested value", row_idx + 1),
        }),
    }
}

fn build_table(names: Vec<String>, columns: Vec<Vec<Cell>>) -> Result<Table, EngineError> {
    let mut table = Table::new();
    for (name, cells) in names.into_iter().zip(columns) {
        table.add_column(name, cells)?;
    }
    Ok(table)
}

// ── Tests ─────────────────────────────────────────────────────────────
