//! Ranked-list records and the helpers that produce them.
//!
//! Records are plain data; turning them into console lines is done by
//! `display_line()` so ranking can be tested without any text layout.

use crate::fmt::bytes_to_mib;

/// Maximum number of binary logs shown.
pub const BINLOG_LIMIT: usize = 15;
/// Maximum number of databases listed in the tables-per-database panel.
pub const DATABASE_LIMIT: usize = 15;
/// Maximum number of slow queries shown.
pub const SLOW_QUERY_LIMIT: usize = 5;
/// Maximum number of running operations shown.
pub const TOP_OPERATIONS_LIMIT: usize = 5;

/// Schemas that belong to the server itself and are never counted.
pub const SYSTEM_SCHEMAS: [&str; 4] = ["information_schema", "performance_schema", "mysql", "sys"];

/// Table name reported when none can be found in a query.
pub const UNKNOWN_TABLE: &str = "Unknown";

/// Keywords that are followed by a table name.
const TABLE_KEYWORDS: [&str; 3] = ["FROM", "INTO", "UPDATE"];

/// A binary log file and its size.
/// Source: `SHOW BINARY LOGS`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinlogRecord {
    pub name: String,
    pub size_bytes: u64,
}

impl BinlogRecord {
    pub fn display_line(&self) -> String {
        format!("{}: {:.2} MB", self.name, bytes_to_mib(self.size_bytes))
    }
}

/// Number of tables in one user database.
/// Source: `information_schema.tables`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTables {
    pub name: String,
    pub tables: u64,
}

impl DatabaseTables {
    pub fn display_line(&self) -> String {
        format!("{}: {} tables", self.name, self.tables)
    }
}

/// User databases on the server.
///
/// `total` counts every user database whose table count could be read;
/// `top` holds at most [`DATABASE_LIMIT`] of them, largest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub total: usize,
    pub top: Vec<DatabaseTables>,
}

/// A long-running statement.
/// Source: `information_schema.processlist`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlowQuery {
    pub id: u64,
    pub user: String,
    pub time_secs: i64,
}

impl SlowQuery {
    pub fn display_line(&self) -> String {
        format!("ID: {}, User: {}, Time: {}s", self.id, self.user, self.time_secs)
    }
}

/// A running operation together with the table it touches.
/// Source: `information_schema.processlist`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub id: u64,
    pub command: String,
    pub table: String,
    pub time_secs: i64,
}

impl Operation {
    pub fn display_line(&self) -> String {
        format!(
            "ID: {}, Op: {}, Table: {}, Time: {}s",
            self.id, self.command, self.table, self.time_secs
        )
    }
}

/// Keeps the `n` items with the largest key, largest first.
///
/// The sort is stable, so items with equal keys keep their enumeration order.
pub fn top_n_by<T, K, F>(mut items: Vec<T>, n: usize, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items.truncate(n);
    items
}

/// Returns true for schemas owned by the server.
pub fn is_system_schema(name: &str) -> bool {
    SYSTEM_SCHEMAS.contains(&name)
}

/// Returns the token that follows the first `FROM`, `INTO` or `UPDATE` keyword.
///
/// Tokens are split on whitespace and keywords match case-insensitively.
/// The following token is returned verbatim (no quote or schema handling).
/// Returns [`UNKNOWN_TABLE`] when no keyword is followed by a token.
pub fn extract_table_name(query: &str) -> &str {
    let mut words = query.split_whitespace();
    while let Some(word) = words.next() {
        if TABLE_KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw)) {
            return words.next().unwrap_or(UNKNOWN_TABLE);
        }
    }
    UNKNOWN_TABLE
}
