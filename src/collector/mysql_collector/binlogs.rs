//! Largest binary log files.

use mysql::Row;
use mysql::prelude::Queryable;

use super::Database;
use super::queries::BINARY_LOGS;
use crate::collector::traits::{CollectError, MetricSource};
use crate::model::{BINLOG_LIMIT, BinlogRecord, Metric, top_n_by};

/// `SHOW BINARY LOGS`, ranked by size.
///
/// Fails on servers with binary logging disabled; the panel then keeps
/// whatever it showed before.
pub struct BinaryLogs {
    db: Database,
}

impl BinaryLogs {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl MetricSource for BinaryLogs {
    fn name(&self) -> &str {
        "binlogs"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        let rows = self.db.with_conn(|conn| conn.query::<Row, _>(BINARY_LOGS))?;
        // Column count differs between servers (MySQL 8 adds `Encrypted`),
        // so only the first two columns are read.
        let logs = rows
            .into_iter()
            .filter_map(|row| {
                let name = row.get_opt::<String, _>(0)?.ok()?;
                let size = row.get_opt::<u64, _>(1)?.ok()?;
                Some(BinlogRecord {
                    name,
                    size_bytes: size,
                })
            })
            .collect();

        Ok(Metric::Binlogs(rank_binlogs(logs)))
    }
}

fn rank_binlogs(logs: Vec<BinlogRecord>) -> Vec<BinlogRecord> {
    top_n_by(logs, BINLOG_LIMIT, |log| log.size_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_binlogs_largest_first() {
        let logs: Vec<BinlogRecord> = (1..=20)
            .map(|i| BinlogRecord {
                name: format!("mysql-bin.{:06}", i),
                size_bytes: (i % 7) * 1024,
            })
            .collect();

        let ranked = rank_binlogs(logs);

        assert_eq!(ranked.len(), 15);
        assert!(ranked.windows(2).all(|w| w[0].size_bytes >= w[1].size_bytes));
        assert_eq!(ranked[0].size_bytes, 6 * 1024);
        // Ties keep server order.
        assert_eq!(ranked[0].name, "mysql-bin.000006");
        assert_eq!(ranked[1].name, "mysql-bin.000013");
    }
}
