//! Metric collection for the monitored server and the local host.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Collector                           │
//! │  ┌──────────────────────┐   ┌──────────────────────────────┐ │
//! │  │    host sources      │   │      mysql sources           │ │
//! │  │  - cpu / memory      │   │  - SHOW STATUS / VERSION()   │ │
//! │  │  - disk / hostname   │   │  - SHOW BINARY LOGS          │ │
//! │  │  - ip address        │   │  - information_schema.*      │ │
//! │  └──────────┬───────────┘   └──────────────┬───────────────┘ │
//! │             └──────────────┬───────────────┘                 │
//! │                     ┌──────▼───────┐                         │
//! │                     │ MetricSource │ (trait)                 │
//! │                     └──────┬───────┘                         │
//! └────────────────────────────┼─────────────────────────────────┘
//!                              │ Metric
//!                       ┌──────▼─────────┐
//!                       │ SharedSnapshot │ ◄── read by the TUI
//!                       └────────────────┘
//! ```
//!
//! # Testing
//!
//! ```
//! use myglot::collector::{Collector, ScriptedSource};
//! use myglot::model::{Metric, SharedSnapshot};
//!
//! let snapshot = SharedSnapshot::new();
//! let mut collector = Collector::new(snapshot.clone())
//!     .with_source(ScriptedSource::new("connections").then_ok(Metric::Connections(4)));
//! collector.run_cycle();
//! assert_eq!(snapshot.read().connections, 4);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod host;
pub mod mock;
pub mod mysql_collector;
pub mod traits;

pub use collector::{Collector, CollectorTiming, DEFAULT_INTERVAL};
pub use host::host_sources;
pub use mock::ScriptedSource;
pub use mysql_collector::{ConnectError, ConnectionConfig, Database, mysql_sources};
pub use traits::{CollectError, MetricSource};
