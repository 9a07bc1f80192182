//! Aggregation Engine: group-by with a single reduction.
//!
//! Rows group on the raw (non-coerced) value of the key column; the
//! aggregation column is coerced per-cell for every method except
//! `count`, with coercion failures dropping out of their group's
//! reduction. Groups are emitted in ascending key order under the
//! crate-wide total order on cells, so client-side rendering sees a
//! deterministic sequence.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::{Map, Value};

use crate::error::EngineError;
use crate::normalize::coerce_numeric;
use crate::table::{identity_key, key_cmp, Cell, Table};

// ── AggMethod ─────────────────────────────────────────────────────────

/// Reduction applied to each group's aggregation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggMethod {
    Sum,
    Mean,
    Count,
    Max,
    Min,
}

impl AggMethod {
    /// Lower-case name used in the reduced field (`{agg_col}_{method}`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Count => "count",
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

impl std::str::FromStr for AggMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "mean" => Ok(Self::Mean),
            "count" => Ok(Self::Count),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            other => Err(EngineError::UnsupportedAggregationMethod {
                value: other.to_string(),
            }),
        }
    }
}

// ── Result types ──────────────────────────────────────────────────────

/// The reduced value for one group.
#[derive(Debug, Clone, PartialEq)]
pub enum Reduction {
    /// Count of non-missing values (the only reduction that never coerces).
    Count(usize),
    /// Numeric reduction over the group's coercible values.
    Value(f64),
    /// No usable numeric values in the group. Reported, not dropped;
    /// serializes as null.
    Empty,
}

impl Reduction {
    fn to_json(&self) -> Value {
        match self {
            Self::Count(n) => Value::Number((*n as u64).into()),
            Self::Value(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Empty => Value::Null,
        }
    }
}

/// One output row: a distinct group key and its reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: Cell,
    pub value: Reduction,
}

/// Ordered group-by result.
///
/// Serializes as the record sequence
/// `[{group_col: key, "{agg_col}_{method}": value}, ..]`.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Name of the grouping column, used as the key field in records.
    pub group_col: String,
    /// Reduced field name, `{agg_col}_{method}`.
    pub field: String,
    /// Groups in ascending key order.
    pub rows: Vec<GroupRow>,
}

impl Aggregation {
    /// Renders the result as JSON row-objects.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                record.insert(self.group_col.clone(), row.key.to_json());
                record.insert(self.field.clone(), row.value.to_json());
                record
            })
            .collect()
    }
}

impl Serialize for Aggregation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let records = self.records();
        let mut seq = serializer.serialize_seq(Some(records.len()))?;
        for record in &records {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}

// ── Aggregation ───────────────────────────────────────────────────────

#[derive(Default)]
struct Accumulator {
    /// Non-missing aggregation cells, whatever their type.
    present: usize,
    used: usize,
    sum: f64,
    max: f64,
    min: f64,
}

impl Accumulator {
    fn push(&mut self, present: bool, value: Option<f64>) {
        if present {
            self.present += 1;
        }
        if let Some(v) = value {
            if self.used == 0 {
                self.max = v;
                self.min = v;
            } else {
                self.max = self.max.max(v);
                self.min = self.min.min(v);
            }
            self.used += 1;
            self.sum += v;
        }
    }

    fn reduce(&self, method: AggMethod) -> Reduction {
        if method == AggMethod::Count {
            return Reduction::Count(self.present);
        }
        if self.used == 0 {
            return Reduction::Empty;
        }
        Reduction::Value(match method {
            AggMethod::Sum => self.sum,
            AggMethod::Mean => self.sum / self.used as f64,
            AggMethod::Max => self.max,
            AggMethod::Min => self.min,
            AggMethod::Count => unreachable!("handled above"),
        })
    }
}

/// Groups rows by `group_col` and reduces `agg_col` with `method`.
///
/// Rows whose group key is missing are excluded from grouping. Output row
/// count equals the number of distinct non-missing keys.
///
/// ```
/// use tabric::aggregate::{aggregate, AggMethod, Reduction};
/// use tabric::table::{Cell, Table};
///
/// let mut table = Table::new();
/// table.add_column("g".into(), vec![
///     Cell::Text("A".into()), Cell::Text("A".into()), Cell::Text("B".into()),
/// ]).unwrap();
/// table.add_column("v".into(), vec![
///     Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0),
/// ]).unwrap();
///
/// let result = aggregate(&table, "g", "v", AggMethod::Sum).unwrap();
/// assert_eq!(result.field, "v_sum");
/// assert_eq!(result.rows[0].value, Reduction::Value(3.0));
/// assert_eq!(result.rows[1].value, Reduction::Value(3.0));
/// ```
pub fn aggregate(
    table: &Table,
    group_col: &str,
    agg_col: &str,
    method: AggMethod,
) -> Result<Aggregation, EngineError> {
    let group_idx = table.require_column(group_col)?;
    let agg_idx = table.require_column(agg_col)?;

    let keys = table.column(group_idx).unwrap_or(&[]);
    let values = table.column(agg_idx).unwrap_or(&[]);

    // First-seen groups, indexed by identity for exact raw-value equality.
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(Cell, Accumulator)> = Vec::new();

    for (key, cell) in keys.iter().zip(values.iter()) {
        if key.is_missing() {
            continue;
        }
        let slot = *by_key
            .entry(identity_key(key))
            .or_insert_with(|| {
                groups.push((key.clone(), Accumulator::default()));
                groups.len() - 1
            });
        let coerced = if method == AggMethod::Count {
            None
        } else {
            coerce_numeric(cell)
        };
        groups[slot].1.push(!cell.is_missing(), coerced);
    }

    groups.sort_by(|(a, _), (b, _)| key_cmp(a, b));

    let rows = groups
        .iter()
        .map(|(key, acc)| GroupRow {
            key: key.clone(),
            value: acc.reduce(method),
        })
        .collect();

    Ok(Aggregation {
        group_col: group_col.to_string(),
        field: format!("{}_{}", agg_col, method.as_str()),
        rows,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped(keys: Vec<Cell>, values: Vec<Cell>) -> Table {
        let mut table = Table::new();
        table.add_column("g".into(), keys).unwrap();
        table.add_column("v".into(), values).unwrap();
        table
    }

    #[test]
    fn method_from_str() {
        assert_eq!("sum".parse::<AggMethod>().unwrap(), AggMethod::Sum);
        assert_eq!("MEAN".parse::<AggMethod>().unwrap(), AggMethod::Mean);
        assert!(matches!(
            "mode".parse::<AggMethod>(),
            Err(EngineError::UnsupportedAggregationMethod { .. })
        ));
    }

    #[test]
    fn sum_by_group() {
        let table = grouped(
            vec![
                Cell::Text("A".into()),
                Cell::Text("A".into()),
                Cell::Text("B".into()),
            ],
            vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)],
        );
        let result = aggregate(&table, "g", "v", AggMethod::Sum).unwrap();
        assert_eq!(result.field, "v_sum");
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].key, Cell::Text("A".into()));
        assert_eq!(result.rows[0].value, Reduction::Value(3.0));
        assert_eq!(result.rows[1].key, Cell::Text("B".into()));
        assert_eq!(result.rows[1].value, Reduction::Value(3.0));
    }

    #[test]
    fn mean_max_min() {
        let table = grouped(
            vec![
                Cell::Text("A".into()),
                Cell::Text("A".into()),
                Cell::Text("A".into()),
            ],
            vec![Cell::Number(2.0), Cell::Number(8.0), Cell::Number(5.0)],
        );
        let mean = aggregate(&table, "g", "v", AggMethod::Mean).unwrap();
        assert_eq!(mean.rows[0].value, Reduction::Value(5.0));

        let max = aggregate(&table, "g", "v", AggMethod::Max).unwrap();
        assert_eq!(max.rows[0].value, Reduction::Value(8.0));

        let min = aggregate(&table, "g", "v", AggMethod::Min).unwrap();
        assert_eq!(min.rows[0].value, Reduction::Value(2.0));
    }

    #[test]
    fn count_never_coerces() {
        let table = grouped(
            vec![Cell::Text("A".into()), Cell::Text("A".into())],
            vec![Cell::Text("not".into()), Cell::Text("numbers".into())],
        );
        let result = aggregate(&table, "g", "v", AggMethod::Count).unwrap();
        assert_eq!(result.field, "v_count");
        assert_eq!(result.rows[0].value, Reduction::Count(2));
    }

    #[test]
    fn count_skips_missing_values() {
        let table = grouped(
            vec![
                Cell::Text("A".into()),
                Cell::Text("A".into()),
                Cell::Text("A".into()),
            ],
            vec![Cell::Number(1.0), Cell::Missing, Cell::Text("x".into())],
        );
        let result = aggregate(&table, "g", "v", AggMethod::Count).unwrap();
        assert_eq!(result.rows[0].value, Reduction::Count(2));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json[0]["v_count"], 2);
    }

    #[test]
    fn coercion_failures_drop_out_of_reduction() {
        let table = grouped(
            vec![
                Cell::Text("A".into()),
                Cell::Text("A".into()),
                Cell::Text("A".into()),
            ],
            vec![
                Cell::Text("4".into()),
                Cell::Text("junk".into()),
                Cell::Missing,
            ],
        );
        let result = aggregate(&table, "g", "v", AggMethod::Sum).unwrap();
        assert_eq!(result.rows[0].value, Reduction::Value(4.0));
    }

    #[test]
    fn all_unusable_group_reported_as_empty() {
        let table = grouped(
            vec![Cell::Text("A".into()), Cell::Text("B".into())],
            vec![Cell::Text("junk".into()), Cell::Number(1.0)],
        );
        let result = aggregate(&table, "g", "v", AggMethod::Sum).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].value, Reduction::Empty);
        assert_eq!(result.rows[1].value, Reduction::Value(1.0));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json[0]["v_sum"], Value::Null);
    }

    #[test]
    fn missing_keys_excluded() {
        let table = grouped(
            vec![Cell::Text("A".into()), Cell::Missing, Cell::Text("A".into())],
            vec![Cell::Number(1.0), Cell::Number(10.0), Cell::Number(2.0)],
        );
        let result = aggregate(&table, "g", "v", AggMethod::Sum).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].value, Reduction::Value(3.0));
    }

    #[test]
    fn groups_sorted_ascending() {
        let table = grouped(
            vec![
                Cell::Text("beta".into()),
                Cell::Text("alpha".into()),
                Cell::Number(10.0),
                Cell::Number(2.0),
            ],
            vec![
                Cell::Number(1.0),
                Cell::Number(1.0),
                Cell::Number(1.0),
                Cell::Number(1.0),
            ],
        );
        let result = aggregate(&table, "g", "v", AggMethod::Count).unwrap();
        let keys: Vec<Cell> = result.rows.iter().map(|r| r.key.clone()).collect();
        // Numbers order by value and sort before text.
        assert_eq!(
            keys,
            vec![
                Cell::Number(2.0),
                Cell::Number(10.0),
                Cell::Text("alpha".into()),
                Cell::Text("beta".into())
            ]
        );
    }

    #[test]
    fn distinct_key_count_matches_output_rows() {
        let table = grouped(
            vec![
                Cell::Number(1.0),
                Cell::Number(2.0),
                Cell::Number(1.0),
                Cell::Number(3.0),
            ],
            vec![
                Cell::Number(1.0),
                Cell::Number(1.0),
                Cell::Number(1.0),
                Cell::Number(1.0),
            ],
        );
        let result = aggregate(&table, "g", "v", AggMethod::Mean).unwrap();
        assert_eq!(result.rows.len(), 3);
    }

    #[test]
    fn unknown_columns() {
        let table = grouped(vec![Cell::Text("A".into())], vec![Cell::Number(1.0)]);
        assert!(matches!(
            aggregate(&table, "nope", "v", AggMethod::Sum),
            Err(EngineError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            aggregate(&table, "g", "nope", AggMethod::Sum),
            Err(EngineError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn records_shape() {
        let table = grouped(
            vec![Cell::Text("A".into())],
            vec![Cell::Number(2.5)],
        );
        let result = aggregate(&table, "g", "v", AggMethod::Sum).unwrap();
        let records = result.records();
        assert_eq!(records[0]["g"], "A");
        assert_eq!(records[0]["v_sum"], serde_json::json!(2.5));
    }
}
