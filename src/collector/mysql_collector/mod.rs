//! MariaDB/MySQL metrics collector.
//!
//! Collects server metrics over a single connection:
//! - `Threads_connected`: open client connections
//! - `SHOW SLAVE STATUS`: replication state
//! - `SELECT VERSION()`: server version
//! - `Com_select/insert/update/delete`: statement counters
//! - `SHOW BINARY LOGS`: largest binary logs
//! - `SHOW DATABASES` + `information_schema.tables`: tables per database
//! - `information_schema.processlist`: slow queries and top operations
//!
//! All sources share one [`Database`] handle. A connection that breaks is
//! dropped and re-established on the next query, so a restarted server is
//! picked up without restarting the console.

mod binlogs;
mod databases;
mod processlist;
mod queries;
mod status;

use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};

use mysql::{Conn, Opts, OptsBuilder};
use thiserror::Error;
use tracing::{debug, info};

use super::traits::{CollectError, MetricSource};
use crate::model::QueryKind;

pub use binlogs::BinaryLogs;
pub use databases::DatabaseTableCounts;
pub use processlist::{SlowQueries, TopOperations};
pub use status::{GlobalCounter, ReplicationStatus, ServerVersion, ThreadsConnected};

/// Default MariaDB/MySQL TCP port.
pub const DEFAULT_PORT: u16 = 3306;

/// Error establishing the initial connection. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid host '{0}'")]
    InvalidHost(String),
    #[error("Error connecting to the database: {0}")]
    Connect(#[source] mysql::Error),
    #[error("Error pinging the database: {0}")]
    Ping(#[source] mysql::Error),
}

/// Connection parameters given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl ConnectionConfig {
    /// Builds a config; `host` may carry a `:port` suffix.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        host: &str,
        database: impl Into<String>,
    ) -> Result<Self, ConnectError> {
        let (host, port) = parse_host(host)?;
        Ok(Self {
            user: user.into(),
            password: password.into(),
            host,
            port,
            database: database.into(),
        })
    }

    /// `host:port/database`, for logs. Never includes credentials.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }

    fn opts(&self) -> Opts {
        OptsBuilder::new()
            .user(Some(self.user.as_str()))
            .pass(Some(self.password.as_str()))
            .ip_or_hostname(Some(self.host.as_str()))
            .tcp_port(self.port)
            .db_name(Some(self.database.as_str()))
            .into()
    }
}

/// Splits `host` or `host:port`. A bare IPv6 address keeps the default port.
fn parse_host(input: &str) -> Result<(String, u16), ConnectError> {
    let input = input.trim();
    let invalid = || ConnectError::InvalidHost(input.to_string());

    if input.is_empty() {
        return Err(invalid());
    }

    match input.split_once(':') {
        Some((_, rest)) if rest.contains(':') => Ok((input.to_string(), DEFAULT_PORT)),
        Some((host, port)) if !host.is_empty() => {
            Ok((host.to_string(), port.parse().map_err(|_| invalid())?))
        }
        Some(_) => Err(invalid()),
        None => Ok((input.to_string(), DEFAULT_PORT)),
    }
}

/// A lazily re-established server connection.
struct MysqlClient {
    opts: Opts,
    conn: Option<Conn>,
}

impl MysqlClient {
    /// Runs `f` on the connection, reconnecting first if needed.
    ///
    /// Connection-level failures drop the connection so the next call
    /// starts fresh.
    fn run<T>(
        &mut self,
        f: impl FnOnce(&mut Conn) -> mysql::Result<T>,
    ) -> Result<T, CollectError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                let conn = Conn::new(self.opts.clone())
                    .map_err(|e| CollectError::Connection(e.to_string()))?;
                info!("Database connection re-established");
                conn
            }
        };
        let conn = self.conn.insert(conn);

        match f(conn) {
            Ok(value) => Ok(value),
            Err(e) if is_connection_error(&e) => {
                self.conn = None;
                Err(CollectError::Connection(e.to_string()))
            }
            Err(e) => Err(CollectError::Query(e.to_string())),
        }
    }
}

fn is_connection_error(e: &mysql::Error) -> bool {
    matches!(e, mysql::Error::IoError(_) | mysql::Error::DriverError(_))
}

/// Shared handle to the monitored server.
///
/// Cloned into every database source; queries are serialized on one connection.
#[derive(Clone)]
pub struct Database {
    client: Arc<Mutex<MysqlClient>>,
}

impl Database {
    /// Connects and pings the server.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, ConnectError> {
        let opts = config.opts();
        let mut conn = Conn::new(opts.clone()).map_err(ConnectError::Connect)?;
        conn.ping().map_err(ConnectError::Ping)?;

        Ok(Self {
            client: Arc::new(Mutex::new(MysqlClient {
                opts,
                conn: Some(conn),
            })),
        })
    }

    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Conn) -> mysql::Result<T>,
    ) -> Result<T, CollectError> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .run(f)
    }
}

/// Keeps the rows that converted, logging the rest.
///
/// Pairs with the `*_opt` query methods, which report a row that does not
/// fit the requested type instead of panicking on it.
pub(crate) fn converted_rows<T, E: Display>(rows: Vec<Result<T, E>>, query: &str) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match row {
            Ok(row) => Some(row),
            Err(e) => {
                debug!(query, error = %e, "skipping unreadable row");
                None
            }
        })
        .collect()
}

/// The single row a status read expects; a missing or unreadable row fails.
pub(crate) fn single_row<T, E: Display>(
    row: Option<Result<T, E>>,
    query: &str,
) -> Result<T, CollectError> {
    match row {
        Some(Ok(row)) => Ok(row),
        Some(Err(e)) => Err(CollectError::Query(format!(
            "unreadable row for \"{}\": {}",
            query, e
        ))),
        None => Err(CollectError::Query(format!("no rows for \"{}\"", query))),
    }
}

/// All database sources, in panel order.
pub fn mysql_sources(db: &Database) -> Vec<Box<dyn MetricSource>> {
    let mut sources: Vec<Box<dyn MetricSource>> = vec![
        Box::new(ThreadsConnected::new(db.clone())),
        Box::new(ReplicationStatus::new(db.clone())),
        Box::new(ServerVersion::new(db.clone())),
        Box::new(DatabaseTableCounts::new(db.clone())),
        Box::new(BinaryLogs::new(db.clone())),
    ];
    for kind in QueryKind::ALL {
        sources.push(Box::new(GlobalCounter::new(db.clone(), kind)));
    }
    sources.push(Box::new(SlowQueries::new(db.clone())));
    sources.push(Box::new(TopOperations::new(db.clone())));
    sources
}
