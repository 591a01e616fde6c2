//! Projection of a `serverStatus` document onto a [`MetricSample`].

use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};

use crate::collector::traits::CollectError;
use crate::model::{MetricSample, ReplicaRole};

/// Extracts the fixed metric set from a `serverStatus` document.
///
/// Pure projection: the same document and role always give the same sample.
/// Any missing key fails the whole sample with [`CollectError::MissingField`].
pub fn extract(status: &Document, role: ReplicaRole) -> Result<MetricSample, CollectError> {
    let host = match lookup(status, "host")? {
        Bson::String(s) => short_host(s).to_string(),
        other => return Err(unexpected_type("host", "string", other)),
    };

    Ok(MetricSample {
        host,
        role,
        connections: counter(status, "connections.current")?,
        inserts: counter(status, "opcounters.insert")?,
        queries: counter(status, "opcounters.query")?,
        updates: counter(status, "opcounters.update")?,
        deletes: counter(status, "opcounters.delete")?,
        getmore: counter(status, "opcounters.getmore")?,
        commands: counter(status, "opcounters.command")?,
        cursors_total: counter(status, "metrics.cursor.open.total")?,
        cursors_no_timeout: counter(status, "metrics.cursor.open.noTimeout")?,
        timestamp: local_time(status)?,
    })
}

/// Hostname up to the first `.`.
fn short_host(host: &str) -> &str {
    host.split('.').next().unwrap_or(host)
}

/// Walks a dotted path through nested documents.
fn lookup<'a>(doc: &'a Document, path: &str) -> Result<&'a Bson, CollectError> {
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(key) = segments.next() {
        let value = current
            .get(key)
            .ok_or_else(|| CollectError::MissingField(path.to_string()))?;
        if segments.peek().is_none() {
            return Ok(value);
        }
        current = match value {
            Bson::Document(inner) => inner,
            _ => return Err(CollectError::MissingField(path.to_string())),
        };
    }
    Err(CollectError::MissingField(path.to_string()))
}

/// Reads a non-negative integer counter. Servers report these as
/// int32, int64 or (for some metrics) double.
fn counter(doc: &Document, path: &str) -> Result<u64, CollectError> {
    match lookup(doc, path)? {
        Bson::Int32(v) => non_negative(path, i64::from(*v)),
        Bson::Int64(v) => non_negative(path, *v),
        Bson::Double(v) if v.is_finite() && *v >= 0.0 => Ok(*v as u64),
        Bson::Double(v) => Err(invalid(path, format!("unusable value {}", v))),
        other => Err(unexpected_type(path, "number", other)),
    }
}

fn non_negative(path: &str, value: i64) -> Result<u64, CollectError> {
    u64::try_from(value).map_err(|_| invalid(path, format!("negative value {}", value)))
}

fn local_time(doc: &Document) -> Result<DateTime<Utc>, CollectError> {
    match lookup(doc, "localTime")? {
        Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis())
            .ok_or_else(|| invalid("localTime", "out of range".to_string())),
        other => Err(unexpected_type("localTime", "datetime", other)),
    }
}

fn unexpected_type(path: &str, expected: &str, value: &Bson) -> CollectError {
    let reason = format!("expected {}, got {:?}", expected, value.element_type());
    invalid(path, reason)
}

fn invalid(path: &str, reason: String) -> CollectError {
    CollectError::InvalidField {
        path: path.to_string(),
        reason,
    }
}
