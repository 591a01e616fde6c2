//! Metric sample model and the canonical column list.

use chrono::{DateTime, Utc};
use mongodb::bson::Document;
use serde::Deserialize;

use crate::collector::CollectError;
use crate::config::ConfigError;

/// One column of the monitoring log.
///
/// Variant order is the canonical column order; every rendered line keeps it
/// regardless of the order the operator listed fields in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Host,
    Status,
    Connections,
    Inserts,
    Query,
    Updates,
    Deletes,
    GetMore,
    Command,
    CursorsTotal,
    CursorsNoTimeout,
    Timestamp,
}

impl Metric {
    /// All metrics in canonical order.
    pub const ALL: [Metric; 12] = [
        Metric::Host,
        Metric::Status,
        Metric::Connections,
        Metric::Inserts,
        Metric::Query,
        Metric::Updates,
        Metric::Deletes,
        Metric::GetMore,
        Metric::Command,
        Metric::CursorsTotal,
        Metric::CursorsNoTimeout,
        Metric::Timestamp,
    ];

    /// Column name as written in the log header.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Host => "Host",
            Metric::Status => "Status",
            Metric::Connections => "Connections",
            Metric::Inserts => "Inserts",
            Metric::Query => "Query",
            Metric::Updates => "Updates",
            Metric::Deletes => "Deletes",
            Metric::GetMore => "GetMore",
            Metric::Command => "Command",
            Metric::CursorsTotal => "CursorsTotal",
            Metric::CursorsNoTimeout => "CursorsNoTimeout",
            Metric::Timestamp => "Timestamp",
        }
    }

    /// Case-insensitive lookup by column name.
    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

impl std::str::FromStr for Metric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::from_name(s.trim()).ok_or_else(|| ConfigError::UnknownField(s.trim().to_string()))
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Replication role reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplicaRole {
    Primary,
    Secondary,
    /// Server is not a member of a named replica set.
    #[default]
    Unknown,
}

/// Subset of the `hello`/`isMaster` reply used for role resolution.
#[derive(Debug, Deserialize)]
struct HelloReply {
    #[serde(rename = "setName")]
    set_name: Option<String>,
    #[serde(default, alias = "isWritablePrimary")]
    ismaster: bool,
}

impl ReplicaRole {
    /// Resolves the role from an `isMaster` reply.
    ///
    /// A reply without `setName` (standalone or mongos) yields `Unknown`.
    /// A reply whose fields have the wrong type is an
    /// [`CollectError::InvalidField`].
    pub fn from_hello(reply: &Document) -> Result<ReplicaRole, CollectError> {
        let decoded = mongodb::bson::from_document::<HelloReply>(reply.clone());
        let reply = decoded.map_err(|e| CollectError::InvalidField {
            path: "isMaster".to_string(),
            reason: e.to_string(),
        })?;
        let role = match reply {
            HelloReply {
                set_name: Some(_),
                ismaster: true,
            } => ReplicaRole::Primary,
            HelloReply {
                set_name: Some(_),
                ismaster: false,
            } => ReplicaRole::Secondary,
            HelloReply { set_name: None, .. } => ReplicaRole::Unknown,
        };
        Ok(role)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReplicaRole::Primary => "Primary",
            ReplicaRole::Secondary => "Secondary",
            ReplicaRole::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ReplicaRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of the server's cumulative counters.
///
/// Counters are raw cumulative values as reported by `serverStatus`,
/// never deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSample {
    /// Short hostname (everything before the first `.`).
    pub host: String,
    pub role: ReplicaRole,
    pub connections: u64,
    pub inserts: u64,
    pub queries: u64,
    pub updates: u64,
    pub deletes: u64,
    pub getmore: u64,
    pub commands: u64,
    pub cursors_total: u64,
    pub cursors_no_timeout: u64,
    /// Server-reported `localTime`.
    pub timestamp: DateTime<Utc>,
}
