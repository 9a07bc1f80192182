//! Error types for tabric.

use thiserror::Error;

/// All errors produced by tabric operations.
///
/// Every variant except [`Io`](EngineError::Io) is a local, recoverable
/// condition: the caller asked for something the table cannot provide.
/// Operations are deterministic, so retrying without changed input never
/// helps.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Requested column is absent from the table.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    /// A parameter required by the chosen operation was omitted.
    #[error("parameter '{name}' is required for this operation")]
    MissingParameter { name: &'static str },

    /// Chart type outside the recognized set.
    #[error("unsupported chart type '{value}'")]
    UnsupportedChartType { value: String },

    /// Aggregation method outside the recognized set.
    #[error("unsupported aggregation method '{value}'")]
    UnsupportedAggregationMethod { value: String },

    /// Sort order outside the recognized set.
    #[error("unsupported sort order '{value}'")]
    UnsupportedSortOrder { value: String },

    /// Table format outside the recognized set.
    #[error("unsupported table format '{value}'")]
    UnsupportedFormat { value: String },

    /// A column yields zero usable numeric values after coercion.
    ///
    /// An expected dataset condition, not a fault: the caller picked a
    /// column whose values do not read as numbers.
    #[error("column '{column}' contains no valid numeric data")]
    NoValidNumericData { column: String },

    /// Correlation requested on a table with fewer than 2 numeric columns.
    #[error("correlation requires at least 2 numeric columns, found {found}")]
    InsufficientNumericColumns { found: usize },

    /// Column length does not match the table's row count.
    #[error("expected {expected} rows, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Column name already present in the table.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// Raw input could not be decoded into a table.
    #[error("import failed: {message}")]
    Import { message: String },

    /// I/O error while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
