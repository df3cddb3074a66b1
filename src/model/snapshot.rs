//! The live snapshot and the updates written into it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};

use super::records::{BinlogRecord, DatabaseSummary, Operation, SlowQuery};

/// Host memory usage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    pub used_percent: f64,
    pub total_bytes: u64,
}

/// Usage of the filesystem holding the server data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub free_bytes: u64,
    pub used_percent: f64,
}

/// Statement counters exposed as `Com_*` global status variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryKind {
    pub const ALL: [QueryKind; 4] = [
        QueryKind::Select,
        QueryKind::Insert,
        QueryKind::Update,
        QueryKind::Delete,
    ];

    /// Name of the global status variable holding this counter.
    pub fn status_variable(self) -> &'static str {
        match self {
            QueryKind::Select => "Com_select",
            QueryKind::Insert => "Com_insert",
            QueryKind::Update => "Com_update",
            QueryKind::Delete => "Com_delete",
        }
    }
}

/// Outcome of one collector cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStats {
    pub finished_at: DateTime<Local>,
    pub duration: Duration,
    pub failed: usize,
    pub sources: usize,
}

/// A single field update produced by a metric source.
///
/// Each variant maps to exactly one [`Snapshot`] field.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    /// Open client connections.
    /// Source: `Threads_connected`
    Connections(u64),

    /// Replication state text.
    /// Source: `SHOW SLAVE STATUS`
    Replication(String),

    /// Host name of the machine running the console.
    Hostname(String),

    /// First non-loopback IPv4 address of the host.
    IpAddress(String),

    /// Server version string.
    /// Source: `SELECT VERSION()`
    DbVersion(String),

    /// Global CPU usage in percent.
    Cpu(f32),

    /// Host memory usage.
    Memory(MemoryUsage),

    /// Root filesystem usage.
    Disk(DiskUsage),

    /// User databases and their table counts.
    /// Source: `SHOW DATABASES` + `information_schema.tables`
    Databases(DatabaseSummary),

    /// Largest binary logs, ranked.
    /// Source: `SHOW BINARY LOGS`
    Binlogs(Vec<BinlogRecord>),

    /// Longest running statements, ranked.
    /// Source: `information_schema.processlist`
    SlowQueries(Vec<SlowQuery>),

    /// Longest running operations with their target table, ranked.
    /// Source: `information_schema.processlist`
    TopOperations(Vec<Operation>),

    /// One statement counter.
    /// Source: `SHOW GLOBAL STATUS LIKE 'Com_*'`
    QueryCount(QueryKind, u64),
}

impl Metric {
    /// Name of the snapshot field this metric updates.
    pub fn field(&self) -> &'static str {
        match self {
            Metric::Connections(_) => "connections",
            Metric::Replication(_) => "replication",
            Metric::Hostname(_) => "hostname",
            Metric::IpAddress(_) => "ip_address",
            Metric::DbVersion(_) => "db_version",
            Metric::Cpu(_) => "cpu",
            Metric::Memory(_) => "memory",
            Metric::Disk(_) => "disk",
            Metric::Databases(_) => "databases",
            Metric::Binlogs(_) => "binlogs",
            Metric::SlowQueries(_) => "slow_queries",
            Metric::TopOperations(_) => "top_operations",
            Metric::QueryCount(QueryKind::Select, _) => "com_select",
            Metric::QueryCount(QueryKind::Insert, _) => "com_insert",
            Metric::QueryCount(QueryKind::Update, _) => "com_update",
            Metric::QueryCount(QueryKind::Delete, _) => "com_delete",
        }
    }
}

/// Latest known value of every monitored metric.
///
/// Starts blank; fields are only ever replaced by a successful read,
/// so a failed source leaves its last value visible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub connections: u64,
    pub replication: String,
    pub hostname: String,
    pub ip_address: String,
    pub db_version: String,
    pub cpu_percent: Option<f32>,
    pub memory: Option<MemoryUsage>,
    pub disk: Option<DiskUsage>,
    pub databases: Option<DatabaseSummary>,
    pub binlogs: Vec<BinlogRecord>,
    pub slow_queries: Vec<SlowQuery>,
    pub top_operations: Vec<Operation>,
    pub com_select: u64,
    pub com_insert: u64,
    pub com_update: u64,
    pub com_delete: u64,
    pub last_cycle: Option<CycleStats>,
}

impl Snapshot {
    /// Writes one metric into its field. No other field is touched.
    pub fn apply(&mut self, metric: Metric) {
        match metric {
            Metric::Connections(n) => self.connections = n,
            Metric::Replication(s) => self.replication = s,
            Metric::Hostname(s) => self.hostname = s,
            Metric::IpAddress(s) => self.ip_address = s,
            Metric::DbVersion(s) => self.db_version = s,
            Metric::Cpu(pct) => self.cpu_percent = Some(pct),
            Metric::Memory(m) => self.memory = Some(m),
            Metric::Disk(d) => self.disk = Some(d),
            Metric::Databases(d) => self.databases = Some(d),
            Metric::Binlogs(v) => self.binlogs = v,
            Metric::SlowQueries(v) => self.slow_queries = v,
            Metric::TopOperations(v) => self.top_operations = v,
            Metric::QueryCount(kind, n) => *self.counter_mut(kind) = n,
        }
    }

    /// Current value of a statement counter.
    pub fn counter(&self, kind: QueryKind) -> u64 {
        match kind {
            QueryKind::Select => self.com_select,
            QueryKind::Insert => self.com_insert,
            QueryKind::Update => self.com_update,
            QueryKind::Delete => self.com_delete,
        }
    }

    fn counter_mut(&mut self, kind: QueryKind) -> &mut u64 {
        match kind {
            QueryKind::Select => &mut self.com_select,
            QueryKind::Insert => &mut self.com_insert,
            QueryKind::Update => &mut self.com_update,
            QueryKind::Delete => &mut self.com_delete,
        }
    }
}

/// Handle to the one snapshot shared by the collector and the console.
///
/// A single mutex guards the whole structure. Writers hold it for one field
/// update at a time, readers for one clone, so the console may observe
/// fields from different collector cycles.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<Mutex<Snapshot>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic in another thread mid-update cannot leave a field half written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merges one metric into the snapshot.
    pub fn apply(&self, metric: Metric) {
        self.lock().apply(metric);
    }

    /// Records the outcome of a completed collector cycle.
    pub fn record_cycle(&self, stats: CycleStats) {
        self.lock().last_cycle = Some(stats);
    }

    /// Returns a copy of the current values.
    pub fn read(&self) -> Snapshot {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DatabaseTables;
    use std::thread;

    #[test]
    fn test_default_snapshot_is_blank() {
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.connections, 0);
        assert_eq!(snapshot.replication, "");
        assert!(snapshot.cpu_percent.is_none());
        assert!(snapshot.binlogs.is_empty());
        assert!(snapshot.last_cycle.is_none());
    }

    #[test]
    fn test_apply_touches_only_its_field() {
        let mut snapshot = Snapshot::default();
        snapshot.apply(Metric::Hostname("db-01".to_string()));
        snapshot.apply(Metric::Connections(12));

        let before = snapshot.clone();
        snapshot.apply(Metric::QueryCount(QueryKind::Update, 99));

        assert_eq!(snapshot.com_update, 99);
        assert_eq!(snapshot.counter(QueryKind::Update), 99);
        let mut expected = before;
        expected.com_update = 99;
        assert_eq!(snapshot, expected);
    }

    #[test]
    fn test_apply_replaces_lists() {
        let mut snapshot = Snapshot::default();
        snapshot.apply(Metric::Databases(DatabaseSummary {
            total: 2,
            top: vec![
                DatabaseTables {
                    name: "shop".to_string(),
                    tables: 10,
                },
                DatabaseTables {
                    name: "crm".to_string(),
                    tables: 3,
                },
            ],
        }));
        snapshot.apply(Metric::Databases(DatabaseSummary::default()));

        assert_eq!(snapshot.databases, Some(DatabaseSummary::default()));
    }

    #[test]
    fn test_metric_field_names_are_unique() {
        let metrics = vec![
            Metric::Connections(0),
            Metric::Replication(String::new()),
            Metric::Hostname(String::new()),
            Metric::IpAddress(String::new()),
            Metric::DbVersion(String::new()),
            Metric::Cpu(0.0),
            Metric::Memory(MemoryUsage {
                used_percent: 0.0,
                total_bytes: 0,
            }),
            Metric::Disk(DiskUsage {
                free_bytes: 0,
                used_percent: 0.0,
            }),
            Metric::Databases(DatabaseSummary::default()),
            Metric::Binlogs(Vec::new()),
            Metric::SlowQueries(Vec::new()),
            Metric::TopOperations(Vec::new()),
            Metric::QueryCount(QueryKind::Select, 0),
            Metric::QueryCount(QueryKind::Insert, 0),
            Metric::QueryCount(QueryKind::Update, 0),
            Metric::QueryCount(QueryKind::Delete, 0),
        ];

        let mut fields: Vec<&str> = metrics.iter().map(Metric::field).collect();
        fields.sort_unstable();
        fields.dedup();
        assert_eq!(fields.len(), metrics.len());
    }

    #[test]
    fn test_shared_snapshot_is_visible_across_clones() {
        let shared = SharedSnapshot::new();
        let reader = shared.clone();

        shared.apply(Metric::DbVersion("10.11.6-MariaDB".to_string()));
        assert_eq!(reader.read().db_version, "10.11.6-MariaDB");
    }

    #[test]
    fn test_shared_snapshot_concurrent_writes() {
        let shared = SharedSnapshot::new();
        let writers: Vec<_> = QueryKind::ALL
            .into_iter()
            .map(|kind| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for n in 1..=100 {
                        shared.apply(Metric::QueryCount(kind, n));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let snapshot = shared.read();
        for kind in QueryKind::ALL {
            assert_eq!(snapshot.counter(kind), 100);
        }
    }

    #[test]
    fn test_shared_snapshot_survives_poisoned_lock() {
        let shared = SharedSnapshot::new();
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("poison the snapshot lock");
        })
        .join();

        shared.apply(Metric::Connections(3));
        assert_eq!(shared.read().connections, 3);
    }

    #[test]
    fn test_status_variable_names() {
        let names: Vec<&str> = QueryKind::ALL.iter().map(|k| k.status_variable()).collect();
        assert_eq!(names, vec!["Com_select", "Com_insert", "Com_update", "Com_delete"]);
    }
}
