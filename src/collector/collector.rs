//! Background loop that keeps the shared snapshot fresh.
//!
//! The `Collector` owns every metric source, runs them once per interval
//! and merges each successful result into the `SharedSnapshot`.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, info, trace, warn};

use crate::collector::traits::MetricSource;
use crate::fmt::format_elapsed;
use crate::model::{CycleStats, SharedSnapshot};
use crate::shutdown::Shutdown;

/// Pause between two collection cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Timing information for the last cycle.
///
/// Used for debug logging.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total cycle time.
    pub total: Duration,
    /// Time spent in each source, in invocation order.
    pub sources: Vec<(String, Duration)>,
}

impl CollectorTiming {
    /// The slowest source of the cycle, if any ran.
    pub fn slowest(&self) -> Option<(&str, Duration)> {
        self.sources
            .iter()
            .max_by_key(|(_, elapsed)| *elapsed)
            .map(|(name, elapsed)| (name.as_str(), *elapsed))
    }
}

/// Runs every metric source on a fixed cadence.
///
/// Cycles never overlap: the next one starts `interval` after the previous
/// one finished writing, with no drift correction.
pub struct Collector {
    sources: Vec<Box<dyn MetricSource>>,
    snapshot: SharedSnapshot,
    interval: Duration,
    last_timing: Option<CollectorTiming>,
}

impl Collector {
    /// Creates a collector writing into `snapshot`, with no sources yet.
    pub fn new(snapshot: SharedSnapshot) -> Self {
        Self {
            sources: Vec::new(),
            snapshot,
            interval: DEFAULT_INTERVAL,
            last_timing: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_source(mut self, source: impl MetricSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn with_sources(mut self, sources: Vec<Box<dyn MetricSource>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Returns timing of the last completed cycle.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    /// Runs every source once.
    ///
    /// A failing source is logged and skipped; its snapshot field keeps the
    /// previous value. The snapshot lock is never held while a source runs.
    pub fn run_cycle(&mut self) -> CycleStats {
        let started = Instant::now();
        let mut timing = CollectorTiming::default();
        let mut failed = 0;

        for source in &mut self.sources {
            let source_started = Instant::now();
            let result = source.collect();
            let elapsed = source_started.elapsed();
            timing.sources.push((source.name().to_string(), elapsed));

            match result {
                Ok(metric) => {
                    trace!(source = source.name(), field = metric.field(), "metric collected");
                    self.snapshot.apply(metric);
                }
                Err(e) => {
                    failed += 1;
                    warn!(source = source.name(), error = %e, "metric collection failed");
                }
            }
        }

        timing.total = started.elapsed();
        let stats = CycleStats {
            finished_at: Local::now(),
            duration: timing.total,
            failed,
            sources: self.sources.len(),
        };
        self.snapshot.record_cycle(stats);

        if let Some((slowest, elapsed)) = timing.slowest() {
            debug!(
                "Cycle: {} sources, {} failed, took {} (slowest: {} {})",
                stats.sources,
                failed,
                format_elapsed(timing.total),
                slowest,
                format_elapsed(elapsed)
            );
        }
        self.last_timing = Some(timing);

        stats
    }

    /// Collects until `shutdown` is triggered.
    ///
    /// Shutdown is checked before each cycle and during the sleep between
    /// cycles. A source that hangs delays shutdown until it returns.
    pub fn run(mut self, shutdown: &Shutdown) {
        info!(
            "Collector started: {} sources, interval {}",
            self.sources.len(),
            format_elapsed(self.interval)
        );

        while !shutdown.is_triggered() {
            self.run_cycle();
            if !shutdown.sleep(self.interval) {
                break;
            }
        }

        info!("Collector stopped");
    }

    /// Moves the collector onto its own thread.
    pub fn spawn(self, shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("collector".to_string())
            .spawn(move || self.run(&shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::ScriptedSource;
    use crate::model::{
        BinlogRecord, DatabaseSummary, DatabaseTables, DiskUsage, MemoryUsage, Metric, Operation,
        QueryKind, SlowQuery, Snapshot,
    };
    use std::collections::HashSet;

    /// One scripted source per snapshot field, each yielding `first` then `second`.
    fn scripted_pair(first: Vec<Metric>, second: Vec<Option<Metric>>) -> Vec<Box<dyn MetricSource>> {
        first
            .into_iter()
            .zip(second)
            .map(|(a, b)| {
                let source = ScriptedSource::new(a.field()).then_ok(a);
                let source = match b {
                    Some(metric) => source.then_ok(metric),
                    None => source.then_err("Access denied"),
                };
                Box::new(source) as Box<dyn MetricSource>
            })
            .collect()
    }

    fn cycle_one() -> Vec<Metric> {
        vec![
            Metric::Connections(5),
            Metric::Replication("No replication".to_string()),
            Metric::Hostname("db-01".to_string()),
            Metric::IpAddress("10.0.0.5".to_string()),
            Metric::DbVersion("10.11.6-MariaDB".to_string()),
            Metric::Cpu(12.5),
            Metric::Memory(MemoryUsage {
                used_percent: 40.0,
                total_bytes: 8 << 30,
            }),
            Metric::Disk(DiskUsage {
                free_bytes: 100 << 30,
                used_percent: 55.5,
            }),
            Metric::Databases(DatabaseSummary {
                total: 2,
                top: vec![DatabaseTables {
                    name: "shop".to_string(),
                    tables: 42,
                }],
            }),
            Metric::Binlogs(vec![BinlogRecord {
                name: "mysql-bin.000001".to_string(),
                size_bytes: 1 << 20,
            }]),
            Metric::SlowQueries(vec![SlowQuery {
                id: 1,
                user: "app".to_string(),
                time_secs: 10,
            }]),
            Metric::TopOperations(vec![Operation {
                id: 1,
                command: "Query".to_string(),
                table: "orders".to_string(),
                time_secs: 10,
            }]),
            Metric::QueryCount(QueryKind::Select, 1000),
            Metric::QueryCount(QueryKind::Insert, 200),
            Metric::QueryCount(QueryKind::Update, 30),
            Metric::QueryCount(QueryKind::Delete, 4),
        ]
    }

    fn cycle_two() -> Vec<Metric> {
        vec![
            Metric::Connections(8),
            Metric::Replication("Replication active".to_string()),
            Metric::Hostname("db-02".to_string()),
            Metric::IpAddress("10.0.0.6".to_string()),
            Metric::DbVersion("10.11.7-MariaDB".to_string()),
            Metric::Cpu(80.0),
            Metric::Memory(MemoryUsage {
                used_percent: 41.0,
                total_bytes: 8 << 30,
            }),
            Metric::Disk(DiskUsage {
                free_bytes: 99 << 30,
                used_percent: 56.0,
            }),
            Metric::Databases(DatabaseSummary::default()),
            Metric::Binlogs(Vec::new()),
            Metric::SlowQueries(Vec::new()),
            Metric::TopOperations(Vec::new()),
            Metric::QueryCount(QueryKind::Select, 1500),
            Metric::QueryCount(QueryKind::Insert, 250),
            Metric::QueryCount(QueryKind::Update, 31),
            Metric::QueryCount(QueryKind::Delete, 9),
        ]
    }

    fn expected(metrics: Vec<Metric>) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for metric in metrics {
            snapshot.apply(metric);
        }
        snapshot
    }

    fn without_cycle(mut snapshot: Snapshot) -> Snapshot {
        snapshot.last_cycle = None;
        snapshot
    }

    #[test]
    fn test_fixtures_cover_every_field() {
        let fields: HashSet<&str> = cycle_one().iter().map(Metric::field).collect();
        assert_eq!(fields.len(), 16);
        let second: Vec<&str> = cycle_two().iter().map(Metric::field).collect();
        let first: Vec<&str> = cycle_one().iter().map(Metric::field).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_populates_snapshot() {
        let shared = SharedSnapshot::new();
        let second = cycle_two().into_iter().map(Some).collect();
        let mut collector =
            Collector::new(shared.clone()).with_sources(scripted_pair(cycle_one(), second));

        let stats = collector.run_cycle();

        assert_eq!(stats.failed, 0);
        assert_eq!(stats.sources, 16);
        assert_eq!(without_cycle(shared.read()), expected(cycle_one()));
        assert_eq!(shared.read().last_cycle, Some(stats));
    }

    #[test]
    fn test_failed_source_keeps_previous_value() {
        for failing in 0..cycle_one().len() {
            let shared = SharedSnapshot::new();
            let mut second: Vec<Option<Metric>> = cycle_two().into_iter().map(Some).collect();
            second[failing] = None;
            let mut collector =
                Collector::new(shared.clone()).with_sources(scripted_pair(cycle_one(), second));

            collector.run_cycle();
            let stats = collector.run_cycle();
            assert_eq!(stats.failed, 1);

            // Only the failing field keeps its first-cycle value.
            let mut want = cycle_two();
            want[failing] = cycle_one().swap_remove(failing);
            let field = want[failing].field();
            assert_eq!(
                without_cycle(shared.read()),
                expected(want),
                "failing source: {}",
                field
            );
        }
    }

    #[test]
    fn test_never_read_field_stays_default() {
        let shared = SharedSnapshot::new();
        let mut collector = Collector::new(shared.clone())
            .with_source(ScriptedSource::new("cpu").then_err("no cpu stats"))
            .with_source(ScriptedSource::new("connections").then_ok(Metric::Connections(2)));

        let stats = collector.run_cycle();

        assert_eq!(stats.failed, 1);
        let snapshot = shared.read();
        assert!(snapshot.cpu_percent.is_none());
        assert_eq!(snapshot.connections, 2);
    }

    #[test]
    fn test_timing_recorded_per_source() {
        let mut collector = Collector::new(SharedSnapshot::new())
            .with_source(ScriptedSource::new("a").then_ok(Metric::Connections(1)))
            .with_source(ScriptedSource::new("b").then_err("boom"));

        assert!(collector.last_timing().is_none());
        collector.run_cycle();

        let timing = collector.last_timing().unwrap();
        let names: Vec<&str> = timing.sources.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(timing.slowest().is_some());
    }

    #[test]
    fn test_run_returns_after_shutdown() {
        let shared = SharedSnapshot::new();
        let shutdown = Shutdown::new();
        let collector = Collector::new(shared.clone())
            .with_interval(Duration::from_secs(60))
            .with_source(ScriptedSource::new("connections").then_ok(Metric::Connections(7)));

        let handle = collector.spawn(shutdown.clone()).unwrap();

        // Wait for the first cycle to land, then stop mid-sleep.
        let deadline = Instant::now() + Duration::from_secs(5);
        while shared.read().last_cycle.is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        shutdown.trigger();
        handle.join().unwrap();

        assert_eq!(shared.read().connections, 7);
    }

    #[test]
    fn test_run_skips_cycle_when_already_shut_down() {
        let shared = SharedSnapshot::new();
        let shutdown = Shutdown::new();
        shutdown.trigger();

        Collector::new(shared.clone())
            .with_source(ScriptedSource::new("connections").then_ok(Metric::Connections(7)))
            .run(&shutdown);

        assert!(shared.read().last_cycle.is_none());
    }
}
