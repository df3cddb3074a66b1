//! Abstraction over individual metric sources.
//!
//! The `MetricSource` trait lets the collector drive host probes, database
//! queries and scripted test sources the same way.

use thiserror::Error;

use crate::model::Metric;

/// Error returned by a single metric source.
///
/// Never fatal: the collector logs it and keeps the previous value.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The data source connection is missing or broken.
    #[error("connection error: {0}")]
    Connection(String),
    /// A query ran but failed or returned unusable data.
    #[error("query error: {0}")]
    Query(String),
    /// The metric cannot be read on this host or server.
    #[error("{0} not available")]
    Unavailable(String),
}

/// A single data-gathering unit producing one metric per call.
///
/// Sources are invoked sequentially from the collector thread and may keep
/// state between calls (previous CPU counters, open connections).
pub trait MetricSource: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Reads the current value.
    fn collect(&mut self) -> Result<Metric, CollectError>;
}

impl<S: MetricSource + ?Sized> MetricSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        (**self).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u64);

    impl MetricSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn collect(&mut self) -> Result<Metric, CollectError> {
            Ok(Metric::Connections(self.0))
        }
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut boxed: Box<dyn MetricSource> = Box::new(Fixed(4));
        assert_eq!(boxed.name(), "fixed");
        assert_eq!(boxed.collect().unwrap(), Metric::Connections(4));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CollectError::Unavailable("disk usage".to_string()).to_string(),
            "disk usage not available"
        );
        assert_eq!(
            CollectError::Query("Table 'x' doesn't exist".to_string()).to_string(),
            "query error: Table 'x' doesn't exist"
        );
    }
}
