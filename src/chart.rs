//! Chart Shaper: chart-ready payloads for an external renderer.
//!
//! Four shapes are produced, and their serialized forms are a contract
//! client code depends on:
//!
//! - bar/pie: `{"type", "data": [{"name", "value"}, ..], "xAxis", "yAxis"}`
//! - line: `{"type": "line", "data": [[label, value], ..], "xAxis", "yAxis"}`
//! - heatmap: `{"type": "heatmap", "x_axis": [..], "y_axis": [..],
//!   "data": [[col_index, row_index, value], ..]}`
//!
//! Heatmap delegates to the Statistics Engine's correlation; a table with
//! too few numeric columns yields a typed error *inside* the payload
//! (`{"type": "heatmap", "error": ..}`) instead of an `Err`, because the
//! renderer still needs something to show.

use serde::Serialize;

use crate::aggregate::{aggregate, AggMethod, Reduction};
use crate::error::EngineError;
use crate::stats::correlate;
use crate::table::{Cell, Table};

// ── ChartType ─────────────────────────────────────────────────────────

/// The recognized chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Pie,
    Line,
    Heatmap,
}

impl std::str::FromStr for ChartType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "pie" => Ok(Self::Pie),
            "line" => Ok(Self::Line),
            "heatmap" => Ok(Self::Heatmap),
            other => Err(EngineError::UnsupportedChartType {
                value: other.to_string(),
            }),
        }
    }
}

// ── Payload shapes ────────────────────────────────────────────────────

/// A `{name, value}` data point for bar and pie charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedPoint {
    pub name: Cell,
    pub value: f64,
}

/// Chart data: keyed points for bar/pie, positional pairs for line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    Named(Vec<NamedPoint>),
    Positional(Vec<(Cell, f64)>),
}

/// Bar, pie, or line payload.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesChart {
    #[serde(rename = "type")]
    pub chart: ChartType,
    pub data: ChartData,
    #[serde(rename = "xAxis")]
    pub x_axis: String,
    #[serde(rename = "yAxis")]
    pub y_axis: String,
}

/// Correlation heatmap payload.
///
/// `data` holds `[column_index, row_index, value]` triples — column index
/// is the inner/x position, row index the outer/y position — with values
/// rounded to 4 decimal places. Triple count is (numeric columns)².
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapChart {
    #[serde(rename = "type")]
    pub chart: ChartType,
    pub x_axis: Vec<String>,
    pub y_axis: Vec<String>,
    pub data: Vec<(usize, usize, f64)>,
}

/// A chart that could not be produced from this dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ChartUnavailable {
    #[serde(rename = "type")]
    pub chart: ChartType,
    pub error: String,
}

/// Tagged union over the chart-ready shapes.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChartPayload {
    Series(SeriesChart),
    Heatmap(HeatmapChart),
    Unavailable(ChartUnavailable),
}

// ── Shaping ───────────────────────────────────────────────────────────

/// Shapes a table into a chart payload.
///
/// Heatmap ignores `label_col`/`value_col`. Every other type requires
/// both, groups by label, sums the coerced values per group, and sorts
/// output by label ascending — unconditionally, independent of any sort
/// requested elsewhere.
///
/// ```
/// use tabric::chart::{shape, ChartData, ChartPayload, ChartType};
/// use tabric::table::{Cell, Table};
///
/// let mut table = Table::new();
/// table.add_column("x".into(), vec![
///     Cell::Text("p".into()), Cell::Text("q".into()),
/// ]).unwrap();
/// table.add_column("y".into(), vec![
///     Cell::Number(1.0), Cell::Number(2.0),
/// ]).unwrap();
///
/// let payload = shape(&table, Some("x"), Some("y"), ChartType::Line).unwrap();
/// let ChartPayload::Series(series) = payload else { panic!("expected series") };
/// assert_eq!(series.data, ChartData::Positional(vec![
///     (Cell::Text("p".into()), 1.0),
///     (Cell::Text("q".into()), 2.0),
/// ]));
/// ```
pub fn shape(
    table: &Table,
    label_col: Option<&str>,
    value_col: Option<&str>,
    chart_type: ChartType,
) -> Result<ChartPayload, EngineError> {
    if chart_type == ChartType::Heatmap {
        return heatmap(table);
    }

    let label_col = label_col.ok_or(EngineError::MissingParameter { name: "label_col" })?;
    let value_col = value_col.ok_or(EngineError::MissingParameter { name: "value_col" })?;

    // Group by label and sum; aggregate already emits ascending key order.
    let summed = aggregate(table, label_col, value_col, AggMethod::Sum)?;
    let points: Vec<(Cell, f64)> = summed
        .rows
        .into_iter()
        .map(|row| {
            let value = match row.value {
                Reduction::Value(v) => v,
                // A group with nothing to sum charts as zero.
                Reduction::Empty => 0.0,
                Reduction::Count(n) => n as f64,
            };
            (row.key, value)
        })
        .collect();

    let data = match chart_type {
        ChartType::Line => ChartData::Positional(points),
        _ => ChartData::Named(
            points
                .into_iter()
                .map(|(name, value)| NamedPoint { name, value })
                .collect(),
        ),
    };

    Ok(ChartPayload::Series(SeriesChart {
        chart: chart_type,
        data,
        x_axis: label_col.to_string(),
        y_axis: value_col.to_string(),
    }))
}

fn heatmap(table: &Table) -> Result<ChartPayload, EngineError> {
    let matrix = match correlate(table) {
        Ok(matrix) => matrix,
        Err(err @ EngineError::InsufficientNumericColumns { .. }) => {
            return Ok(ChartPayload::Unavailable(ChartUnavailable {
                chart: ChartType::Heatmap,
                error: err.to_string(),
            }));
        }
        Err(err) => return Err(err),
    };

    let mut data = Vec::with_capacity(matrix.columns.len() * matrix.columns.len());
    for (row_idx, row) in matrix.data.iter().enumerate() {
        for (col_idx, &value) in row.iter().enumerate() {
            data.push((col_idx, row_idx, round4(value)));
        }
    }

    Ok(ChartPayload::Heatmap(HeatmapChart {
        chart: ChartType::Heatmap,
        x_axis: matrix.columns.clone(),
        y_axis: matrix.columns,
        data,
    }))
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// ── Tests ─────────────────────────────────────────────────────────────
