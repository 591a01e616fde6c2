//! Live MongoDB status source.

use mongodb::bson::{Document, doc};
use mongodb::sync::{Client, Database};
use tracing::debug;

use crate::collector::traits::{CollectError, StatusSource};
use crate::model::ReplicaRole;

const REPLICA_SET_PARAM: &str = "replicaSet=rs0";
const DIRECT_CONNECTION_PARAM: &str = "directConnection=true";

/// Rewrites `replicaSet=rs0` to `directConnection=true`.
///
/// The monitor talks to exactly one node, so a replica-set URI is turned
/// into a direct connection. Only this literal substring is replaced.
pub fn normalize_uri(uri: &str) -> String {
    if uri.contains(REPLICA_SET_PARAM) {
        uri.replace(REPLICA_SET_PARAM, DIRECT_CONNECTION_PARAM)
    } else {
        uri.to_string()
    }
}

/// Status source backed by one long-lived client on the `admin` database.
pub struct MongoStatusSource {
    client: Option<Client>,
    admin: Option<Database>,
}

impl MongoStatusSource {
    /// Connects to the server and verifies it answers `ping`.
    ///
    /// The URI is normalised with [`normalize_uri`] first.
    pub fn connect(uri: &str) -> Result<Self, CollectError> {
        let uri = normalize_uri(uri);
        let client =
            Client::with_uri_str(&uri).map_err(|e| CollectError::Connection(e.to_string()))?;
        let admin = client.database("admin");
        admin
            .run_command(doc! { "ping": 1 }, None)
            .map_err(|e| CollectError::Connection(e.to_string()))?;
        debug!("connected, ping ok");

        Ok(Self {
            client: Some(client),
            admin: Some(admin),
        })
    }

    fn run(&self, command: Document) -> Result<Document, CollectError> {
        let admin = self
            .admin
            .as_ref()
            .ok_or_else(|| CollectError::Connection("connection closed".to_string()))?;
        admin
            .run_command(command, None)
            .map_err(|e| CollectError::Command(e.to_string()))
    }
}

impl StatusSource for MongoStatusSource {
    fn server_status(&mut self) -> Result<Document, CollectError> {
        self.run(doc! { "serverStatus": 1 })
    }

    fn replica_role(&mut self) -> Result<ReplicaRole, CollectError> {
        let reply = self.run(doc! { "isMaster": 1 })?;
        ReplicaRole::from_hello(&reply)
    }

    fn close(&mut self) {
        self.admin = None;
        if self.client.take().is_some() {
            debug!("MongoDB client released");
        }
    }
}
