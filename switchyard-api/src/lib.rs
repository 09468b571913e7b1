//! Switchyard collaborator interfaces.
//!
//! The weight engine never talks to a cloud API itself: it is handed a
//! complete record snapshot and a sink for the resulting change batch.
//! This crate defines that seam as async traits for the record-set
//! source, the record-set sink, and the version registry, plus an
//! in-memory provider implementing all three for tests and local use.

use async_trait::async_trait;
use switchyard_core::domain::{RecordChange, RoutingRecord, StackVersion};
use thiserror::Error;

pub mod memory;

pub use memory::MemoryProvider;

/// Errors surfaced by record sources, sinks, and registries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No hosted zone exists for the requested domain.
    #[error("hosted zone for domain {0:?} not found")]
    ZoneNotFound(String),

    /// A remote operation failed (network, throttling, permission,
    /// rejected change batch). Propagated unmodified; no retry.
    #[error("remote operation failed: {0}")]
    Remote(String),
}

/// Handle to one hosted DNS zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Provider-assigned zone id.
    pub id: String,
    /// Zone name, e.g. `example.org`.
    pub name: String,
}

/// Opaque continuation token for paginated record listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken(pub(crate) usize);

/// One page of a record listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPage {
    /// The records on this page.
    pub records: Vec<RoutingRecord>,
    /// Token for the next page, absent on the last page.
    pub next: Option<PageToken>,
}

/// Read side of the record-set seam: zone lookup and paginated listing.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Resolves the hosted zone serving `domain`.
    async fn zone(&self, domain: &str) -> Result<HostedZone, ApiError>;

    /// Lists one page of the zone's routing records, starting at
    /// `cursor` (or the beginning when absent).
    async fn list_page(
        &self,
        zone: &HostedZone,
        cursor: Option<PageToken>,
    ) -> Result<RecordPage, ApiError>;
}

/// Write side of the record-set seam.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Applies `changes` to the zone as one atomic batch: the whole
    /// batch takes effect or none of it does.
    async fn apply(
        &self,
        zone: &HostedZone,
        comment: &str,
        changes: &[RecordChange],
    ) -> Result<(), ApiError>;
}

/// Maps stack names to their deployed versions, newest first.
#[async_trait]
pub trait VersionRegistry: Send + Sync {
    /// All known versions of `stack_name`, newest first. An unknown
    /// stack yields an empty list, not an error.
    async fn stack_versions(&self, stack_name: &str) -> Result<Vec<StackVersion>, ApiError>;
}

/// Exhausts the source's pagination and returns the complete record set
/// for the zone. The snapshot reader requires the full set, so every
/// shift goes through here before any weight is computed.
pub async fn list_complete(
    source: &dyn RecordSource,
    zone: &HostedZone,
) -> Result<Vec<RoutingRecord>, ApiError> {
    let mut records = Vec::new();
    let mut cursor = None;
    loop {
        let page = source.list_page(zone, cursor).await?;
        records.extend(page.records);
        match page.next {
            Some(next) => cursor = Some(next),
            None => return Ok(records),
        }
    }
}
