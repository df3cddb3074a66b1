//! SQL text for MariaDB/MySQL status queries.

use crate::model::QueryKind;

pub(super) const THREADS_CONNECTED: &str = "SHOW STATUS LIKE 'Threads_connected'";

pub(super) const REPLICA_STATUS: &str = "SHOW SLAVE STATUS";

pub(super) const SERVER_VERSION: &str = "SELECT VERSION()";

pub(super) const BINARY_LOGS: &str = "SHOW BINARY LOGS";

pub(super) const DATABASES: &str = "SHOW DATABASES";

pub(super) const TABLE_COUNT: &str =
    "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ?";

/// Statements currently executing. Ranking happens client-side.
pub(super) const RUNNING_STATEMENTS: &str = r#"
    SELECT id, user, command, time, info
    FROM information_schema.processlist
    WHERE command IN ('Query', 'Execute')
"#;

/// Builds the global status lookup for one statement counter.
pub(super) fn global_status_query(kind: QueryKind) -> String {
    format!("SHOW GLOBAL STATUS LIKE '{}'", kind.status_variable())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_status_query() {
        assert_eq!(
            global_status_query(QueryKind::Delete),
            "SHOW GLOBAL STATUS LIKE 'Com_delete'"
        );
    }
}
