//! Type Normalizer: per-column semantic types and value coercion.
//!
//! Column types are inferred from runtime values with an all-or-nothing
//! policy: a column is only classified Numeric (or Date) when **every**
//! non-missing cell satisfies that interpretation. Partial success never
//! reclassifies, so downstream operations never see a half-typed column.
//!
//! Classification is a tag, not a rewrite — stored cells keep their
//! representation until the [`clean`](crate::clean) stage asks for one.
//! Engine operations recompute types through [`schema`] or [`column_type`]
//! at pipeline boundaries instead of inferring ad hoc mid-operation.
//!
//! # Example
//!
//! ```
//! use tabric::normalize::{column_type, ColumnType};
//! use tabric::table::Cell;
//!
//! let cells = vec![
//!     Cell::Text("3".into()),
//!     Cell::Missing,
//!     Cell::Text(" 4.5 ".into()),
//! ];
//! assert_eq!(column_type(&cells), ColumnType::Numeric);
//! ```

use chrono::{NaiveDate, NaiveDateTime};

use crate::table::{Cell, Table};

// ── ColumnType ────────────────────────────────────────────────────────

/// Semantic type assigned to a column by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Every non-missing value coerces to a number.
    Numeric,
    /// Every non-missing value is text parsing as a calendar date.
    Date,
    /// Anything else.
    Text,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "Numeric"),
            Self::Date => write!(f, "Date"),
            Self::Text => write!(f, "Text"),
        }
    }
}

// ── Numeric coercion ──────────────────────────────────────────────────

/// Best-effort numeric interpretation of a single cell.
///
/// Numbers pass through, booleans read as 1.0/0.0, text is trimmed and
/// parsed as `f64`. Failure yields `None`, never an error.
pub fn coerce_numeric(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) => Some(*v),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Cell::Missing => None,
    }
}

/// A column viewed through numeric coercion.
///
/// `values` is row-aligned with the source column; `excluded` counts the
/// non-missing cells that failed coercion, so callers can observe exactly
/// how many values a silent coercion path dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub values: Vec<Option<f64>>,
    pub excluded: usize,
}

impl NumericColumn {
    /// Returns the coerced values with `None` entries removed.
    pub fn valid_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(|v| *v).collect()
    }
}

/// Coerces every cell of a column to numeric.
pub fn coerce_numeric_column(cells: &[Cell]) -> NumericColumn {
    let mut excluded = 0usize;
    let values = cells
        .iter()
        .map(|cell| {
            let coerced = coerce_numeric(cell);
            if coerced.is_none() && !cell.is_missing() {
                excluded += 1;
            }
            coerced
        })
        .collect();
    NumericColumn { values, excluded }
}

// ── Date coercion ─────────────────────────────────────────────────────

/// Date-only formats accepted by [`parse_date`].
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Datetime formats accepted by [`parse_date`]; the date part is kept.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Best-effort date interpretation of a text value.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }
    None
}

/// Renders a date in the canonical `YYYY-MM-DD` form used by cleaning.
pub fn canonical_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ── Column classification ─────────────────────────────────────────────

/// Classifies a column from its runtime values.
///
/// Numeric wins when all non-missing cells coerce (vacuously true for an
/// all-missing column, matching the import side where an all-null column
/// defaults to numeric). Date requires every non-missing cell to be text
/// parsing as a date. Everything else is Text.
pub fn column_type(cells: &[Cell]) -> ColumnType {
    let numeric = coerce_numeric_column(cells);
    if numeric.excluded == 0 {
        return ColumnType::Numeric;
    }

    let mut saw_value = false;
    let all_dates = cells.iter().all(|cell| match cell {
        Cell::Missing => true,
        Cell::Text(s) => {
            saw_value = true;
            parse_date(s).is_some()
        }
        _ => false,
    });
    if all_dates && saw_value {
        return ColumnType::Date;
    }

    ColumnType::Text
}

/// Recomputes the full per-column type assignment for a table.
pub fn schema(table: &Table) -> Vec<(String, ColumnType)> {
    table
        .iter()
        .map(|(name, cells)| (name.to_string(), column_type(cells)))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_number_passthrough() {
        assert_eq!(coerce_numeric(&Cell::Number(2.5)), Some(2.5));
    }

    #[test]
    fn coerce_text_trims() {
        assert_eq!(coerce_numeric(&Cell::Text(" 42 ".into())), Some(42.0));
        assert_eq!(coerce_numeric(&Cell::Text("-1.5".into())), Some(-1.5));
        assert_eq!(coerce_numeric(&Cell::Text("abc".into())), None);
    }

    #[test]
    fn coerce_bool_as_indicator() {
        assert_eq!(coerce_numeric(&Cell::Bool(true)), Some(1.0));
        assert_eq!(coerce_numeric(&Cell::Bool(false)), Some(0.0));
    }

    #[test]
    fn coerce_missing_is_none() {
        assert_eq!(coerce_numeric(&Cell::Missing), None);
    }

    #[test]
    fn column_coercion_counts_exclusions() {
        let cells = vec![
            Cell::Text("3".into()),
            Cell::Text("x".into()),
            Cell::Missing,
            Cell::Text("5".into()),
        ];
        let numeric = coerce_numeric_column(&cells);
        assert_eq!(numeric.values, vec![Some(3.0), None, None, Some(5.0)]);
        // Missing cells are not "excluded" — only real coercion failures.
        assert_eq!(numeric.excluded, 1);
        assert_eq!(numeric.valid_values(), vec![3.0, 5.0]);
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_date("2024-03-07"), Some(expected));
        assert_eq!(parse_date("2024/03/07"), Some(expected));
        assert_eq!(parse_date("03/07/2024"), Some(expected));
        assert_eq!(parse_date("07.03.2024"), Some(expected));
        assert_eq!(parse_date("2024-03-07 10:30:00"), Some(expected));
        assert_eq!(parse_date("2024-03-07T10:30:00"), Some(expected));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn canonical_date_rendering() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(canonical_date(date), "2024-01-05");
    }

    #[test]
    fn classify_numeric_all_or_nothing() {
        let numeric = vec![Cell::Text("1".into()), Cell::Missing, Cell::Number(2.0)];
        assert_eq!(column_type(&numeric), ColumnType::Numeric);

        // One bad cell demotes the whole column.
        let mixed = vec![Cell::Text("1".into()), Cell::Text("x".into())];
        assert_eq!(column_type(&mixed), ColumnType::Text);
    }

    #[test]
    fn classify_dates() {
        let dates = vec![
            Cell::Text("2024-01-01".into()),
            Cell::Missing,
            Cell::Text("2024/02/03".into()),
        ];
        assert_eq!(column_type(&dates), ColumnType::Date);

        let broken = vec![Cell::Text("2024-01-01".into()), Cell::Text("soon".into())];
        assert_eq!(column_type(&broken), ColumnType::Text);
    }

    #[test]
    fn classify_all_missing_defaults_numeric() {
        let cells = vec![Cell::Missing, Cell::Missing];
        assert_eq!(column_type(&cells), ColumnType::Numeric);
    }

    #[test]
    fn classify_booleans_numeric() {
        let cells = vec![Cell::Bool(true), Cell::Bool(false)];
        assert_eq!(column_type(&cells), ColumnType::Numeric);
    }

    #[test]
    fn schema_over_table() {
        let mut table = Table::new();
        table
            .add_column("n".into(), vec![Cell::Text("1".into())])
            .unwrap();
        table
            .add_column("d".into(), vec![Cell::Text("2020-05-05".into())])
            .unwrap();
        table
            .add_column("t".into(), vec![Cell::Text("hello".into())])
            .unwrap();

        let types = schema(&table);
        assert_eq!(types[0], ("n".to_string(), ColumnType::Numeric));
        assert_eq!(types[1], ("d".to_string(), ColumnType::Date));
        assert_eq!(types[2], ("t".to_string(), ColumnType::Text));
    }
}
