//! # tabric
//!
//! Tabular analytics engine: a client materializes an in-memory [`Table`]
//! from an uploaded dataset and runs a fixed menu of analyses against it —
//! cleaning, sorting, descriptive statistics, Pearson correlation,
//! group-by aggregation, and chart-ready data shaping.
//!
//! Every operation is a pure function of (table, parameters): tables are
//! built fresh per request, transforming operations return new values,
//! and nothing in the crate holds state across requests. Network
//! transport, file storage, and HTTP mapping live outside; the engine is
//! handed an already-materialized table plus typed parameters.
//!
//! ## Modules
//!
//! - [`table`] — Untyped, row-aligned table storage (Table, Cell)
//! - [`import`] — Import adapter: CSV / TSV / JSON → Table
//! - [`normalize`] — Per-column type inference and numeric/date coercion
//! - [`clean`] — Deduplication, missing-row removal, normalization
//! - [`sort`] — Whole-table sort on one column
//! - [`stats`] — Descriptive statistics and the correlation matrix
//! - [`aggregate`] — Group-by with sum/mean/count/max/min reductions
//! - [`chart`] — Bar / pie / line / heatmap payloads for a renderer
//! - [`error`] — Error types
//!
//! ## Quick Start
//!
//! ```
//! use tabric::clean::clean;
//! use tabric::import::{import_str, TableFormat};
//! use tabric::stats::describe;
//!
//! let csv = "city,temp\noslo,4.5\nlima,18.2\noslo,4.5\n";
//! let table = import_str(csv, TableFormat::Csv).unwrap();
//! assert_eq!(table.row_count(), 3);
//!
//! // One exact-duplicate row goes away.
//! let cleaned = clean(&table);
//! assert_eq!(cleaned.report.removed_rows, 1);
//!
//! let stats = describe(&cleaned.table, "temp").unwrap();
//! assert_eq!(stats.count, 2);
//! ```
//!
//! [`Table`]: table::Table

pub mod aggregate;
pub mod chart;
pub mod clean;
pub mod error;
pub mod import;
pub mod normalize;
pub mod sort;
pub mod stats;
pub mod table;
