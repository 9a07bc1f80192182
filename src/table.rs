//! Row-aligned table of untyped cells.
//!
//! The [`Table`] stores data in column-major order: named columns of
//! [`Cell`] values aligned by row index. Cells stay untyped at the storage
//! level (numeric, text, boolean, or missing) until the
//! [`normalize`](crate::normalize) module assigns per-column semantic types.
//!
//! Tables have value semantics: every transforming operation in this crate
//! returns a new `Table` rather than mutating a shared one, and a table is
//! built fresh per request and dropped when the request completes.
//!
//! # Example
//!
//! ```
//! use tabric::table::{Cell, Table};
//!
//! let mut table = Table::new();
//! table.add_column("city".to_string(), vec![
//!     Cell::Text("Oslo".into()),
//!     Cell::Text("Lima".into()),
//! ]).unwrap();
//! table.add_column("temp".to_string(), vec![
//!     Cell::Number(4.5),
//!     Cell::Missing,
//! ]).unwrap();
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.column_count(), 2);
//! ```

use std::cmp::Ordering;

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::EngineError;

// ── Cell ──────────────────────────────────────────────────────────────

/// A single untyped cell value.
///
/// `Missing` is a distinguished marker for an absent or unparseable value,
/// distinct from an empty string and from zero. Coercion failures produce
/// `Missing`, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A numeric value (stored as `f64`).
    Number(f64),
    /// A text value.
    Text(String),
    /// A boolean value.
    Bool(bool),
    /// An absent or unparseable value.
    Missing,
}

impl Cell {
    /// Returns `true` if this cell is the missing marker.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Renders the cell as text.
    ///
    /// Numbers use their shortest decimal form, booleans render as
    /// `true`/`false`, missing renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Self::Number(v) => format!("{v}"),
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Missing => String::new(),
        }
    }

    /// Converts the cell to a JSON value.
    ///
    /// Non-finite numbers (which JSON cannot carry) and `Missing` both map
    /// to `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Missing => Value::Null,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

/// Total order on cells used wherever deterministic "ascending key order"
/// is promised (group-by output, chart label sorting).
///
/// Cells order by kind first (`Bool` < `Number` < `Text` < `Missing`), then
/// within their kind: `false` < `true`, numbers by value (NaN last), text
/// lexicographically. Missing last keeps absent keys out of the way on the
/// rare path where one survives filtering.
pub(crate) fn key_cmp(a: &Cell, b: &Cell) -> Ordering {
    fn rank(cell: &Cell) -> u8 {
        match cell {
            Cell::Bool(_) => 0,
            Cell::Number(_) => 1,
            Cell::Text(_) => 2,
            Cell::Missing => 3,
        }
    }

    match (a, b) {
        (Cell::Bool(x), Cell::Bool(y)) => x.cmp(y),
        (Cell::Number(x), Cell::Number(y)) => {
            match (x.is_nan(), y.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            }
        }
        (Cell::Text(x), Cell::Text(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Hashable identity key for a cell, used for exact grouping equality.
///
/// Numbers use their bit pattern so that grouping never conflates values
/// through float formatting.
pub(crate) fn identity_key(cell: &Cell) -> String {
    match cell {
        Cell::Number(v) => format!("n{}", v.to_bits()),
        Cell::Text(s) => format!("t{s}"),
        Cell::Bool(b) => format!("b{b}"),
        Cell::Missing => "\u{0}missing".to_string(),
    }
}

// ── Table ─────────────────────────────────────────────────────────────

/// Column-major table of named [`Cell`] columns.
///
/// Column names are unique; all columns have the same number of rows
/// (enforced on construction).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<Cell>>,
    row_count: usize,
}

impl Table {
    /// Creates an empty table with no columns or rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named column to the table.
    ///
    /// Returns an error if the name is already taken, or if the column
    /// length doesn't match the existing row count (unless this is the
    /// first column).
    pub fn add_column(&mut self, name: String, cells: Vec<Cell>) -> Result<(), EngineError> {
        if self.names.iter().any(|n| *n == name) {
            return Err(EngineError::DuplicateColumn { name });
        }
        if self.columns.is_empty() {
            self.row_count = cells.len();
        } else if cells.len() != self.row_count {
            return Err(EngineError::DimensionMismatch {
                expected: self.row_count,
                actual: cells.len(),
            });
        }
        self.names.push(name);
        self.columns.push(cells);
        Ok(())
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns column names in table order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns the cells of the column at `index`.
    pub fn column(&self, index: usize) -> Option<&[Cell]> {
        self.columns.get(index).map(|c| c.as_slice())
    }

    /// Returns the cells of the column with the given `name`.
    pub fn column_by_name(&self, name: &str) -> Option<&[Cell]> {
        self.column_index(name).map(|i| self.columns[i].as_slice())
    }

    /// Returns the index of the column with the given `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Resolves a column name to its index, or fails with `ColumnNotFound`.
    pub fn require_column(&self, name: &str) -> Result<usize, EngineError> {
        self.column_index(name)
            .ok_or_else(|| EngineError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Returns an iterator over (name, cells) pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Cell])> {
        self.names
            .iter()
            .map(|s| s.as_str())
            .zip(self.columns.iter().map(|c| c.as_slice()))
    }

    /// Returns the cells of row `row_idx` in column order.
    pub fn row(&self, row_idx: usize) -> Vec<&Cell> {
        self.columns.iter().map(|col| &col[row_idx]).collect()
    }

    /// Builds a new table containing only the rows at `indices`, in the
    /// given order. Indices must be in bounds.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns: Vec<Vec<Cell>> = self
            .columns
            .iter()
            .map(|col| indices.iter().map(|&i| col[i].clone()).collect())
            .collect();
        Table {
            names: self.names.clone(),
            row_count: indices.len(),
            columns,
        }
    }

    /// Builds a new table with the same column names but replaced cells.
    ///
    /// Used by pipeline stages that rewrite column contents; lengths must
    /// stay uniform, which is the caller's invariant to keep.
    pub(crate) fn with_columns(&self, columns: Vec<Vec<Cell>>) -> Table {
        debug_assert_eq!(columns.len(), self.names.len());
        let row_count = columns.first().map_or(0, |c| c.len());
        Table {
            names: self.names.clone(),
            columns,
            row_count,
        }
    }

    /// Renders the first `limit` rows as JSON row-objects in column order.
    pub fn records(&self, limit: usize) -> Vec<Map<String, Value>> {
        let n = self.row_count.min(limit);
        (0..n)
            .map(|row_idx| {
                let mut record = Map::new();
                for (name, col) in self.iter() {
                    record.insert(name.to_string(), col[row_idx].to_json());
                }
                record
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
