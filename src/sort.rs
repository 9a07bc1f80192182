//! Whole-table sorting on a single column.
//!
//! The sort key depends on the column's inferred type: numeric columns
//! order by coerced value, everything else by the cell's text rendering
//! (mixed columns cannot be compared natively, so they fall back to
//! string comparison). Missing cells sort last under both orders, and the
//! sort is stable, so ties keep their original row order.

use std::cmp::Ordering;

use crate::error::EngineError;
use crate::normalize::{coerce_numeric, column_type, ColumnType};
use crate::table::{Cell, Table};

// ── SortOrder ─────────────────────────────────────────────────────────

/// Direction for [`sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl std::str::FromStr for SortOrder {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(EngineError::UnsupportedSortOrder {
                value: other.to_string(),
            }),
        }
    }
}

// ── Sorting ───────────────────────────────────────────────────────────

/// Returns a new table with rows ordered by `column`.
///
/// ```
/// use tabric::sort::{sort, SortOrder};
/// use tabric::table::{Cell, Table};
///
/// let mut table = Table::new();
/// table.add_column("v".into(), vec![
///     Cell::Text("10".into()),
///     Cell::Text("9".into()),
/// ]).unwrap();
///
/// // Numeric column: 9 sorts before 10, not lexicographically.
/// let sorted = sort(&table, "v", SortOrder::Ascending).unwrap();
/// assert_eq!(sorted.column(0).unwrap()[0], Cell::Text("9".into()));
/// ```
pub fn sort(table: &Table, column: &str, order: SortOrder) -> Result<Table, EngineError> {
    let col_idx = table.require_column(column)?;
    let cells = table.column(col_idx).unwrap_or(&[]);

    let mut indices: Vec<usize> = (0..table.row_count()).collect();
    match column_type(cells) {
        ColumnType::Numeric => {
            let keys: Vec<Option<f64>> = cells.iter().map(coerce_numeric).collect();
            indices.sort_by(|&i, &j| directed(numeric_cmp(keys[i], keys[j]), order, keys[i], keys[j]));
        }
        ColumnType::Date | ColumnType::Text => {
            let keys: Vec<Option<String>> = cells
                .iter()
                .map(|cell| (!cell.is_missing()).then(|| cell.render()))
                .collect();
            indices.sort_by(|&i, &j| {
                directed(keys[i].cmp(&keys[j]), order, keys[i].as_ref(), keys[j].as_ref())
            });
        }
    }

    Ok(table.take_rows(&indices))
}

fn numeric_cmp(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Applies the requested direction while keeping missing keys last either way.
fn directed<T>(cmp: Ordering, order: SortOrder, a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
        (Some(_), Some(_)) => match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[f64]) -> Table {
        let mut table = Table::new();
        table
            .add_column("v".into(), values.iter().map(|&v| Cell::Number(v)).collect())
            .unwrap();
        table
    }

    fn column_values(table: &Table, name: &str) -> Vec<Cell> {
        table.column_by_name(name).unwrap().to_vec()
    }

    #[test]
    fn order_from_str() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert_eq!(
            "Descending".parse::<SortOrder>().unwrap(),
            SortOrder::Descending
        );
        assert!(matches!(
            "sideways".parse::<SortOrder>(),
            Err(EngineError::UnsupportedSortOrder { .. })
        ));
    }

    #[test]
    fn numeric_ascending_and_descending() {
        let table = numbers(&[3.0, 1.0, 2.0]);
        let asc = sort(&table, "v", SortOrder::Ascending).unwrap();
        assert_eq!(
            column_values(&asc, "v"),
            vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)]
        );

        let desc = sort(&table, "v", SortOrder::Descending).unwrap();
        assert_eq!(
            column_values(&desc, "v"),
            vec![Cell::Number(3.0), Cell::Number(2.0), Cell::Number(1.0)]
        );
    }

    #[test]
    fn numeric_text_sorts_by_value() {
        let mut table = Table::new();
        table
            .add_column(
                "v".into(),
                vec![
                    Cell::Text("10".into()),
                    Cell::Text("2".into()),
                    Cell::Text("9".into()),
                ],
            )
            .unwrap();

        let asc = sort(&table, "v", SortOrder::Ascending).unwrap();
        assert_eq!(
            column_values(&asc, "v"),
            vec![
                Cell::Text("2".into()),
                Cell::Text("9".into()),
                Cell::Text("10".into())
            ]
        );
    }

    #[test]
    fn mixed_column_falls_back_to_text() {
        let mut table = Table::new();
        table
            .add_column(
                "v".into(),
                vec![
                    Cell::Text("b".into()),
                    Cell::Number(10.0),
                    Cell::Text("a".into()),
                ],
            )
            .unwrap();

        // Renderings "b", "10", "a" compare as strings.
        let asc = sort(&table, "v", SortOrder::Ascending).unwrap();
        assert_eq!(
            column_values(&asc, "v"),
            vec![
                Cell::Number(10.0),
                Cell::Text("a".into()),
                Cell::Text("b".into())
            ]
        );
    }

    #[test]
    fn missing_sorts_last_in_both_orders() {
        let mut table = Table::new();
        table
            .add_column(
                "v".into(),
                vec![Cell::Missing, Cell::Number(2.0), Cell::Number(1.0)],
            )
            .unwrap();

        let asc = sort(&table, "v", SortOrder::Ascending).unwrap();
        assert_eq!(
            column_values(&asc, "v"),
            vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Missing]
        );

        let desc = sort(&table, "v", SortOrder::Descending).unwrap();
        assert_eq!(
            column_values(&desc, "v"),
            vec![Cell::Number(2.0), Cell::Number(1.0), Cell::Missing]
        );
    }

    #[test]
    fn sort_is_stable_and_moves_whole_rows() {
        let mut table = Table::new();
        table
            .add_column(
                "k".into(),
                vec![Cell::Number(2.0), Cell::Number(1.0), Cell::Number(2.0)],
            )
            .unwrap();
        table
            .add_column(
                "tag".into(),
                vec![
                    Cell::Text("first".into()),
                    Cell::Text("mid".into()),
                    Cell::Text("second".into()),
                ],
            )
            .unwrap();

        let asc = sort(&table, "k", SortOrder::Ascending).unwrap();
        assert_eq!(
            column_values(&asc, "tag"),
            vec![
                Cell::Text("mid".into()),
                Cell::Text("first".into()),
                Cell::Text("second".into())
            ]
        );
    }

    #[test]
    fn unknown_column() {
        let table = numbers(&[1.0]);
        assert!(matches!(
            sort(&table, "nope", SortOrder::Ascending),
            Err(EngineError::ColumnNotFound { .. })
        ));
    }
}
