//! Scripted metric sources for testing.
//!
//! `ScriptedSource` replays a fixed sequence of results so collector
//! behaviour can be checked without a database or a real host.

use std::collections::VecDeque;

use super::traits::{CollectError, MetricSource};
use crate::model::Metric;

/// A source that returns queued results in order.
///
/// Once the script is exhausted every call fails with
/// [`CollectError::Unavailable`].
#[derive(Debug)]
pub struct ScriptedSource {
    name: String,
    script: VecDeque<Result<Metric, CollectError>>,
}

impl ScriptedSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: VecDeque::new(),
        }
    }

    /// Queues a successful read.
    pub fn then_ok(mut self, metric: Metric) -> Self {
        self.script.push_back(Ok(metric));
        self
    }

    /// Queues a failed read.
    pub fn then_err(mut self, message: impl Into<String>) -> Self {
        self.script.push_back(Err(CollectError::Query(message.into())));
        self
    }
}

impl MetricSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&mut self) -> Result<Metric, CollectError> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(CollectError::Unavailable(format!("{} script", self.name))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order() {
        let mut source = ScriptedSource::new("connections")
            .then_ok(Metric::Connections(1))
            .then_err("server has gone away")
            .then_ok(Metric::Connections(3));

        assert_eq!(source.collect().unwrap(), Metric::Connections(1));
        assert!(matches!(source.collect(), Err(CollectError::Query(_))));
        assert_eq!(source.collect().unwrap(), Metric::Connections(3));
        assert!(matches!(source.collect(), Err(CollectError::Unavailable(_))));
    }
}
