//! myglot - live monitoring console for MariaDB/MySQL.
//!
//! Usage:
//!   myglot --user root --password secret --database shop
//!   myglot -u monitor -H db01:3307 -d shop --log-file /tmp/myglot.log
//!   MYSQL_PWD=secret myglot -u monitor -d shop -v

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info, warn};

use myglot::VERSION;
use myglot::collector::{Collector, ConnectionConfig, Database, host_sources, mysql_sources};
use myglot::logging::init_logging;
use myglot::model::SharedSnapshot;
use myglot::shutdown::Shutdown;
use myglot::tui::{App, Event, EventHandler, TerminalGuard};

const USAGE: &str =
    "Usage: myglot --user=<user> --password=<password> --host=<host> --database=<database>";

/// How long to wait for the collector to finish its current cycle on exit.
const COLLECTOR_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Live monitoring console for MariaDB/MySQL.
#[derive(Parser, Debug)]
#[command(name = "myglot", about = "Monitoring console for MariaDB/MySQL", version)]
struct Args {
    /// Database user.
    #[arg(short = 'u', long, env = "MYSQL_USER")]
    user: Option<String>,

    /// Database password.
    #[arg(short = 'p', long, env = "MYSQL_PWD", hide_env_values = true)]
    password: Option<String>,

    /// Database host, optionally with a port (host:port).
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,

    /// Database name.
    #[arg(short = 'd', long)]
    database: Option<String>,

    /// Collection interval in seconds.
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Screen refresh interval in seconds.
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u64).range(1..))]
    refresh: u64,

    /// Append logs to this file. Logs are discarded otherwise.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only log errors.
    #[arg(short, long)]
    quiet: bool,
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl Args {
    /// Connection settings; the error is the message to print before exiting.
    fn connection_config(&self) -> Result<ConnectionConfig, String> {
        let (Some(user), Some(password), Some(database)) = (
            required(&self.user),
            required(&self.password),
            required(&self.database),
        ) else {
            return Err(USAGE.to_string());
        };
        ConnectionConfig::new(user, password, &self.host, database)
            .map_err(|e| format!("Error: {}\n{}", e, USAGE))
    }
}

fn main() {
    let args = Args::parse();

    let config = match args.connection_config() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(args.verbose, args.quiet, args.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    info!("myglot {} starting", VERSION);
    info!(
        "Config: endpoint={}, interval={}s, refresh={}s",
        config.endpoint(),
        args.interval,
        args.refresh
    );

    let db = match Database::connect(&config) {
        Ok(db) => {
            info!("Database connection successfully established");
            db
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    process::exit(run(&args, &db));
}

/// Runs the collector and the console until quit. Returns the exit code.
fn run(args: &Args, db: &Database) -> i32 {
    let snapshot = SharedSnapshot::new();
    let shutdown = Shutdown::new();

    let collector = Collector::new(snapshot.clone())
        .with_interval(Duration::from_secs(args.interval))
        .with_sources(host_sources())
        .with_sources(mysql_sources(db));
    let handle = match collector.spawn(shutdown.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start collector: {}", e);
            eprintln!("Failed to start collector: {}", e);
            return 1;
        }
    };

    let code = present(args, snapshot, shutdown.clone());
    shutdown.trigger();
    join_collector(handle);

    info!("myglot stopped");
    code
}

/// Owns the terminal for the lifetime of the presentation loop.
fn present(args: &Args, snapshot: SharedSnapshot, shutdown: Shutdown) -> i32 {
    let mut guard = match TerminalGuard::init() {
        Ok(guard) => guard,
        Err(e) => {
            error!("{}", e);
            eprintln!("Failed to initialize UI: {}", e);
            return 1;
        }
    };

    let events = match EventHandler::new(Duration::from_secs(args.refresh), shutdown.clone()) {
        Ok(events) => events,
        Err(e) => {
            drop(guard);
            error!("Failed to start event threads: {}", e);
            eprintln!("Failed to start event threads: {}", e);
            return 1;
        }
    };

    let tx = events.sender();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.send(Event::Interrupt);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    match App::new(snapshot, shutdown).run(&mut guard, &events) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error running TUI: {}", e);
            1
        }
    }
}

/// Waits for the collector to notice shutdown. A source stuck in a query
/// is abandoned after the timeout.
fn join_collector(handle: JoinHandle<()>) {
    let deadline = Instant::now() + COLLECTOR_JOIN_TIMEOUT;
    while !handle.is_finished() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(50));
    }

    if !handle.is_finished() {
        warn!("Collector still busy after {:?}, exiting anyway", COLLECTOR_JOIN_TIMEOUT);
        return;
    }
    if handle.join().is_err() {
        error!("Collector thread panicked");
    }
}
