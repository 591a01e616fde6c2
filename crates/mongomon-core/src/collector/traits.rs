//! Abstraction over the database connection.
//!
//! The `StatusSource` trait lets the sampling loop run against a live
//! server or against an in-memory mock in tests.

use mongodb::bson::Document;

use crate::model::ReplicaRole;

/// Error type for status collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    /// Server could not be reached or the client could not be built.
    Connection(String),
    /// A server command failed.
    Command(String),
    /// A required key is absent from the status document.
    MissingField(String),
    /// A key is present but has an unusable value.
    InvalidField { path: String, reason: String },
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Connection(msg) => write!(f, "MongoDB: {}", msg),
            CollectError::Command(msg) => write!(f, "MongoDB command error: {}", msg),
            CollectError::MissingField(path) => {
                write!(f, "serverStatus is missing field '{}'", path)
            }
            CollectError::InvalidField { path, reason } => {
                write!(f, "invalid field '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for CollectError {}

/// Source of server status snapshots.
pub trait StatusSource {
    /// Fetches the raw `serverStatus` document.
    fn server_status(&mut self) -> Result<Document, CollectError>;

    /// Resolves the current replication role.
    fn replica_role(&mut self) -> Result<ReplicaRole, CollectError>;

    /// Releases the underlying connection. Further calls fail.
    fn close(&mut self) {}
}
