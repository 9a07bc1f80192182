//! Statistics Engine: descriptive statistics and Pearson correlation.
//!
//! Both operations work through per-cell numeric coercion: values that
//! fail to read as numbers are silently excluded from the computation
//! (only from the computation — the table is untouched). The excluded
//! count is observable through
//! [`coerce_numeric_column`](crate::normalize::coerce_numeric_column).

use serde::Serialize;

use crate::error::EngineError;
use crate::normalize::{coerce_numeric_column, column_type, ColumnType};
use crate::table::Table;

// ── Descriptive statistics ────────────────────────────────────────────

/// Descriptive statistics for one column.
///
/// `std` and `variance` use the sample (N−1) denominator and are NaN when
/// fewer than two values survive coercion. Serializes to the exchange
/// shape `{count, mean, median, max, min, std, variance}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
    pub std: f64,
    pub variance: f64,
}

/// Computes descriptive statistics for `column`.
///
/// Fails with `ColumnNotFound` for an absent column and
/// `NoValidNumericData` when zero values survive coercion — the latter is
/// an expected dataset condition, never a division fault.
///
/// ```
/// use tabric::stats::describe;
/// use tabric::table::{Cell, Table};
///
/// let mut table = Table::new();
/// table.add_column("b".into(), vec![
///     Cell::Text("3".into()),
///     Cell::Text("x".into()),
///     Cell::Text("5".into()),
/// ]).unwrap();
///
/// let stats = describe(&table, "b").unwrap();
/// assert_eq!(stats.count, 2);
/// assert_eq!(stats.mean, 4.0);
/// ```
pub fn describe(table: &Table, column: &str) -> Result<Statistics, EngineError> {
    let col_idx = table.require_column(column)?;
    let numeric = coerce_numeric_column(table.column(col_idx).unwrap_or(&[]));
    let values = numeric.valid_values();

    if values.is_empty() {
        return Err(EngineError::NoValidNumericData {
            column: column.to_string(),
        });
    }

    let variance = sample_variance(&values);
    Ok(Statistics {
        count: values.len(),
        mean: mean(&values),
        median: median(&values),
        max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        min: values.iter().cloned().fold(f64::INFINITY, f64::min),
        std: variance.sqrt(),
        variance,
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Sample variance (N−1 denominator); NaN for fewer than two values.
fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

// ── Correlation ───────────────────────────────────────────────────────

/// Square, symmetric Pearson correlation matrix.
///
/// Labels follow the order numeric columns appear in the table; `data` is
/// row-major. Serializes to `{columns: [..], data: [[..]]}`.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub data: Vec<Vec<f64>>,
}

/// Computes the pairwise Pearson correlation matrix over numeric columns.
///
/// Columns classified [`Numeric`](ColumnType::Numeric) by the normalizer
/// are selected in table order; everything else is excluded, not
/// zero-filled. Fewer than two numeric columns is an expected dataset
/// condition surfaced as `InsufficientNumericColumns`.
///
/// Each entry uses pairwise-complete observations (rows where both cells
/// coerce). A zero-variance pair has no defined coefficient and yields
/// NaN; the diagonal is exactly 1.0 whenever the column's variance is
/// nonzero.
pub fn correlate(table: &Table) -> Result<CorrelationMatrix, EngineError> {
    let mut names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = Vec::new();
    for (name, cells) in table.iter() {
        if column_type(cells) == ColumnType::Numeric {
            names.push(name.to_string());
            columns.push(coerce_numeric_column(cells).values);
        }
    }

    if names.len() < 2 {
        return Err(EngineError::InsufficientNumericColumns { found: names.len() });
    }

    let n = names.len();
    let mut data = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson_pairwise(&columns[i], &columns[j]);
            data[i][j] = r;
            data[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: names,
        data,
    })
}

/// Pearson coefficient over rows where both values are present.
fn pearson_pairwise(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        })
        .collect();

    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
