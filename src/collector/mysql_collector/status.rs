//! Scalar server status: connections, replication, version, statement counters.

use mysql::Row;
use mysql::prelude::Queryable;

use super::{Database, single_row};
use super::queries::{REPLICA_STATUS, SERVER_VERSION, THREADS_CONNECTED, global_status_query};
use crate::collector::traits::{CollectError, MetricSource};
use crate::model::{Metric, QueryKind};

pub(super) const REPLICATION_ACTIVE: &str = "Replication active";
pub(super) const NO_REPLICATION: &str = "No replication";

/// Reads a `Variable_name | Value` status row.
fn status_value(db: &Database, query: &str) -> Result<u64, CollectError> {
    let row = db.with_conn(|conn| conn.query_first_opt::<(String, u64), _>(query))?;
    single_row(row, query).map(|(_, value)| value)
}

/// `Threads_connected`.
pub struct ThreadsConnected {
    db: Database,
}

impl ThreadsConnected {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl MetricSource for ThreadsConnected {
    fn name(&self) -> &str {
        "connections"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        status_value(&self.db, THREADS_CONNECTED).map(Metric::Connections)
    }
}

/// Replica status.
///
/// Never fails: a server where the status query errors (for example for
/// lack of privileges) is reported the same as one without replication.
pub struct ReplicationStatus {
    db: Database,
}

impl ReplicationStatus {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl MetricSource for ReplicationStatus {
    fn name(&self) -> &str {
        "replication"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        let row = self
            .db
            .with_conn(|conn| conn.query_first::<Row, _>(REPLICA_STATUS));
        Ok(Metric::Replication(replication_text(row).to_string()))
    }
}

fn replication_text<R>(row: Result<Option<R>, CollectError>) -> &'static str {
    match row {
        Ok(Some(_)) => REPLICATION_ACTIVE,
        Ok(None) | Err(_) => NO_REPLICATION,
    }
}

/// `SELECT VERSION()`.
pub struct ServerVersion {
    db: Database,
}

impl ServerVersion {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl MetricSource for ServerVersion {
    fn name(&self) -> &str {
        "db_version"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        let row = self
            .db
            .with_conn(|conn| conn.query_first_opt::<String, _>(SERVER_VERSION))?;
        single_row(row, SERVER_VERSION).map(Metric::DbVersion)
    }
}

/// One cumulative `Com_*` counter.
pub struct GlobalCounter {
    db: Database,
    kind: QueryKind,
    name: String,
    query: String,
}

impl GlobalCounter {
    pub fn new(db: Database, kind: QueryKind) -> Self {
        Self {
            db,
            kind,
            name: kind.status_variable().to_lowercase(),
            query: global_status_query(kind),
        }
    }
}

impl MetricSource for GlobalCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        status_value(&self.db, &self.query).map(|count| Metric::QueryCount(self.kind, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replication_text() {
        assert_eq!(replication_text(Ok(Some(()))), "Replication active");
        assert_eq!(replication_text::<()>(Ok(None)), "No replication");
        assert_eq!(
            replication_text::<()>(Err(CollectError::Query("Access denied".to_string()))),
            "No replication"
        );
    }
}
