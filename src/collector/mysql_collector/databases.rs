//! User databases and their table counts.

use mysql::prelude::Queryable;
use tracing::debug;

use super::{Database, converted_rows};
use super::queries::{DATABASES, TABLE_COUNT};
use crate::collector::traits::{CollectError, MetricSource};
use crate::model::{
    DATABASE_LIMIT, DatabaseSummary, DatabaseTables, Metric, is_system_schema, top_n_by,
};

/// Table count of every non-system database.
///
/// A database whose count cannot be read is left out of both the total
/// and the ranking; only a failing `SHOW DATABASES` fails the source.
pub struct DatabaseTableCounts {
    db: Database,
}

impl DatabaseTableCounts {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl MetricSource for DatabaseTableCounts {
    fn name(&self) -> &str {
        "databases"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        let rows = self.db.with_conn(|conn| conn.query_opt::<String, _>(DATABASES))?;
        let names = converted_rows(rows, DATABASES);

        let mut counted = Vec::new();
        for name in names.into_iter().filter(|n| !is_system_schema(n)) {
            let count = self
                .db
                .with_conn(|conn| conn.exec_first_opt::<u64, _, _>(TABLE_COUNT, (name.as_str(),)));
            match count {
                Ok(Some(Ok(tables))) => counted.push(DatabaseTables { name, tables }),
                Ok(Some(Err(e))) => debug!(database = %name, error = %e, "unreadable table count"),
                Ok(None) => debug!(database = %name, "table count returned no rows"),
                Err(e) => debug!(database = %name, error = %e, "table count failed"),
            }
        }

        Ok(Metric::Databases(summarize(counted)))
    }
}

fn summarize(counted: Vec<DatabaseTables>) -> DatabaseSummary {
    DatabaseSummary {
        total: counted.len(),
        top: top_n_by(counted, DATABASE_LIMIT, |db| db.tables),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(name: &str, tables: u64) -> DatabaseTables {
        DatabaseTables {
            name: name.to_string(),
            tables,
        }
    }

    #[test]
    fn test_summarize_counts_all_ranks_fifteen() {
        let counted: Vec<DatabaseTables> =
            (0..18).map(|i| db(&format!("tenant_{}", i), i)).collect();

        let summary = summarize(counted);

        assert_eq!(summary.total, 18);
        assert_eq!(summary.top.len(), 15);
        assert_eq!(summary.top[0], db("tenant_17", 17));
        assert_eq!(summary.top[14], db("tenant_3", 3));
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(Vec::new()), DatabaseSummary::default());
    }
}
