//! myglot - live monitoring console for MariaDB/MySQL servers.
//!
//! The library is split the same way the running program is:
//! - `collector`: background sampling of host and database metrics
//! - `model`: the shared snapshot, ranked records and the ranking helpers
//! - `tui`: fixed panel layout, rendering and the presentation loop
//! - `shutdown`: cancellation token shared by the collector and the console
//! - `logging`: tracing subscriber setup
//! - `fmt`: unit conversion helpers used by the panels

pub mod collector;
pub mod fmt;
pub mod logging;
pub mod model;
pub mod shutdown;
pub mod tui;

/// Crate version, shown in the console title.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
