//! In-memory status source for testing without a running server.

use std::collections::VecDeque;

use mongodb::bson::{self, Document, doc};

use crate::collector::traits::{CollectError, StatusSource};
use crate::model::ReplicaRole;

/// Builds a `serverStatus`-shaped document with fixed counters
/// (5 connections, 100/200/50/10/3/7 opcounters, 12/2 cursors).
pub fn server_status_fixture(host: &str, local_time_millis: i64) -> Document {
    doc! {
        "host": host,
        "version": "7.0.4",
        "connections": { "current": 5, "available": 838_855 },
        "opcounters": {
            "insert": 100_i64,
            "query": 200_i64,
            "update": 50_i64,
            "delete": 10_i64,
            "getmore": 3_i64,
            "command": 7_i64,
        },
        "metrics": {
            "cursor": {
                "open": { "total": 12_i64, "noTimeout": 2_i64, "pinned": 0_i64 },
            },
        },
        "localTime": bson::DateTime::from_millis(local_time_millis),
    }
}

/// Scripted status source.
///
/// Returns queued documents in order; once the queue is drained the last
/// document is repeated. A configured failure is returned on the given call.
#[derive(Debug, Clone, Default)]
pub struct MockStatusSource {
    statuses: VecDeque<Document>,
    last: Option<Document>,
    role: ReplicaRole,
    fail_on_call: Option<usize>,
    calls: usize,
    closed: bool,
}

impl MockStatusSource {
    pub fn new(role: ReplicaRole) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    /// Primary member on `db-1.example.internal` with fixture counters.
    pub fn typical_primary() -> Self {
        let status = server_status_fixture("db-1.example.internal:27017", 1_704_067_200_000);
        Self::new(ReplicaRole::Primary).with_status(status)
    }

    /// Queues a status document.
    pub fn with_status(mut self, status: Document) -> Self {
        self.statuses.push_back(status);
        self
    }

    /// Makes the n-th `server_status` call (1-based) fail with a connection error.
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Number of `server_status` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl StatusSource for MockStatusSource {
    fn server_status(&mut self) -> Result<Document, CollectError> {
        if self.closed {
            return Err(CollectError::Connection("connection closed".to_string()));
        }
        self.calls += 1;
        if self.fail_on_call == Some(self.calls) {
            return Err(CollectError::Connection("connection reset".to_string()));
        }
        if let Some(next) = self.statuses.pop_front() {
            self.last = Some(next);
        }
        match &self.last {
            Some(status) => Ok(status.clone()),
            None => Err(CollectError::Command("no status queued".to_string())),
        }
    }

    fn replica_role(&mut self) -> Result<ReplicaRole, CollectError> {
        if self.closed {
            return Err(CollectError::Connection("connection closed".to_string()));
        }
        Ok(self.role)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next_host(source: &mut MockStatusSource) -> String {
        let status = source.server_status().unwrap();
        status.get_str("host").unwrap().to_string()
    }

    #[test]
    fn repeats_last_status_after_queue_drains() {
        let mut source = MockStatusSource::new(ReplicaRole::Unknown)
            .with_status(server_status_fixture("a", 1))
            .with_status(server_status_fixture("b", 2));

        assert_eq!(next_host(&mut source), "a");
        assert_eq!(next_host(&mut source), "b");
        assert_eq!(next_host(&mut source), "b");
        assert_eq!(source.calls(), 3);
    }

    #[test]
    fn fails_on_configured_call() {
        let mut source = MockStatusSource::typical_primary().fail_on_call(2);
        assert!(source.server_status().is_ok());
        assert!(matches!(
            source.server_status(),
            Err(CollectError::Connection(_))
        ));
    }

    #[test]
    fn closed_source_refuses_calls() {
        let mut source = MockStatusSource::typical_primary();
        source.close();
        assert!(source.is_closed());
        assert!(source.server_status().is_err());
        assert!(source.replica_role().is_err());
    }
}
