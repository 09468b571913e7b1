//! Routing record and change batch models.

use crate::domain::version::VersionId;
use serde::{Deserialize, Serialize};

/// DNS record type of a routing record. Weighted version routing only uses
/// CNAME records; other types may still appear in a zone listing and are
/// ignored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// Canonical name record pointing at a load balancer endpoint.
    Cname,
    /// IPv4 address record.
    A,
    /// Text record.
    Txt,
}

/// One weighted routing record: a single version's share of a domain's
/// traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRecord {
    /// DNS record type.
    pub record_type: RecordType,
    /// Fully qualified record name (with trailing dot).
    pub name: String,
    /// Identifier of the version this record routes to.
    pub set_identifier: VersionId,
    /// Routing weight in units of `1/PERCENT_RESOLUTION` percent. Records
    /// without an explicit weight count as zero.
    #[serde(default)]
    pub weight: i64,
    /// Record time-to-live in seconds.
    pub ttl: u64,
    /// Record value, the DNS name of the version's load balancer.
    pub value: String,
}

/// Action applied to a single record within a change batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create the record or replace it in place.
    Upsert,
    /// Remove the record entirely.
    Delete,
}

/// One entry of a change batch handed to the record-set sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordChange {
    /// Whether the record is upserted or deleted.
    pub action: ChangeAction,
    /// The record the action applies to.
    pub record: RoutingRecord,
}
