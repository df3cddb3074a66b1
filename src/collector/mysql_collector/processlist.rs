//! Running statements from the process list.

use mysql::prelude::Queryable;

use super::{Database, converted_rows};
use super::queries::RUNNING_STATEMENTS;
use crate::collector::traits::{CollectError, MetricSource};
use crate::model::{
    Metric, Operation, SLOW_QUERY_LIMIT, SlowQuery, TOP_OPERATIONS_LIMIT, extract_table_name,
    top_n_by,
};

/// `id, user, command, time, info`
type ProcessRow = (u64, String, String, i64, Option<String>);

fn running_statements(db: &Database) -> Result<Vec<ProcessRow>, CollectError> {
    let rows = db.with_conn(|conn| conn.query_opt::<ProcessRow, _>(RUNNING_STATEMENTS))?;
    Ok(converted_rows(rows, RUNNING_STATEMENTS))
}

/// Longest running statements and who runs them.
pub struct SlowQueries {
    db: Database,
}

impl SlowQueries {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl MetricSource for SlowQueries {
    fn name(&self) -> &str {
        "slow_queries"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        running_statements(&self.db).map(|rows| Metric::SlowQueries(slow_queries(rows)))
    }
}

/// Longest running statements and the table each one touches.
pub struct TopOperations {
    db: Database,
}

impl TopOperations {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl MetricSource for TopOperations {
    fn name(&self) -> &str {
        "top_operations"
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        running_statements(&self.db).map(|rows| Metric::TopOperations(operations(rows)))
    }
}

fn slow_queries(rows: Vec<ProcessRow>) -> Vec<SlowQuery> {
    let queries = rows
        .into_iter()
        .map(|(id, user, _, time_secs, _)| SlowQuery {
            id,
            user,
            time_secs,
        })
        .collect();
    top_n_by(queries, SLOW_QUERY_LIMIT, |q| q.time_secs)
}

fn operations(rows: Vec<ProcessRow>) -> Vec<Operation> {
    let ops = rows
        .into_iter()
        .map(|(id, _, command, time_secs, info)| Operation {
            id,
            table: extract_table_name(info.as_deref().unwrap_or_default()).to_string(),
            command,
            time_secs,
        })
        .collect();
    top_n_by(ops, TOP_OPERATIONS_LIMIT, |op| op.time_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, time: i64, info: Option<&str>) -> ProcessRow {
        (
            id,
            format!("user{}", id),
            "Query".to_string(),
            time,
            info.map(str::to_string),
        )
    }

    fn sample() -> Vec<ProcessRow> {
        vec![
            row(1, 3, Some("SELECT * FROM orders")),
            row(2, 40, Some("insert into audit_log values (1)")),
            row(3, 12, None),
            row(4, 40, Some("UPDATE users SET name = 'x'")),
            row(5, 1, Some("SHOW PROCESSLIST")),
            row(6, 7, Some("DELETE FROM sessions")),
        ]
    }

    #[test]
    fn test_slow_queries_ranked_by_time() {
        let queries = slow_queries(sample());

        let ids: Vec<u64> = queries.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![2, 4, 3, 6, 1]);
        assert_eq!(queries[0].user, "user2");
        assert_eq!(queries[0].display_line(), "ID: 2, User: user2, Time: 40s");
    }

    #[test]
    fn test_operations_carry_table_name() {
        let ops = operations(sample());

        let tables: Vec<&str> = ops.iter().map(|op| op.table.as_str()).collect();
        assert_eq!(tables, vec!["audit_log", "users", "Unknown", "sessions", "orders"]);
        assert_eq!(
            ops[0].display_line(),
            "ID: 2, Op: Query, Table: audit_log, Time: 40s"
        );
    }

    #[test]
    fn test_empty_processlist() {
        assert!(slow_queries(Vec::new()).is_empty());
        assert!(operations(Vec::new()).is_empty());
    }
}
