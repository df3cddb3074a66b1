//! Data model shared by the collector and the console.
//!
//! - [`snapshot`]: the live [`Snapshot`], its shared handle and the
//!   [`Metric`] updates the collector writes into it
//! - [`records`]: ranked-list records, ranking and query-text helpers
//!
//! # Data flow
//!
//! ```text
//! MetricSource ──Metric──▶ SharedSnapshot ──clone──▶ panel_texts()
//!   (collector thread)      (Arc<Mutex<_>>)           (console thread)
//! ```
//!
//! The snapshot is merged field by field: a metric that could not be
//! collected leaves the previous value in place.

mod records;
mod snapshot;

pub use records::{
    BINLOG_LIMIT, BinlogRecord, DATABASE_LIMIT, DatabaseSummary, DatabaseTables, Operation,
    SLOW_QUERY_LIMIT, SYSTEM_SCHEMAS, SlowQuery, TOP_OPERATIONS_LIMIT, UNKNOWN_TABLE,
    extract_table_name, is_system_schema, top_n_by,
};
pub use snapshot::{
    CycleStats, DiskUsage, MemoryUsage, Metric, QueryKind, SharedSnapshot, Snapshot,
};
