//! JSON-file-backed provider.
//!
//! The state file holds hosted zones with their routing records and the
//! version registry content. It is loaded into a [`MemoryProvider`] on
//! open; a successfully applied change batch is written back before the
//! sink call returns, so the file always reflects the committed record
//! set.

use crate::error::CliResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use switchyard_api::{
    ApiError, HostedZone, MemoryProvider, PageToken, RecordPage, RecordSink, RecordSource,
    VersionRegistry,
};
use switchyard_core::domain::{RecordChange, RoutingRecord, StackVersion};

/// Serialized form of one hosted zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneState {
    /// Zone name, e.g. `example.org`.
    pub name: String,
    /// Routing records in the zone.
    #[serde(default)]
    pub records: Vec<RoutingRecord>,
}

/// Serialized form of one stack's registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackState {
    /// Stack name.
    pub name: String,
    /// Deployed versions, newest first.
    #[serde(default)]
    pub versions: Vec<StackVersion>,
}

/// The state file schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    /// Hosted zones.
    #[serde(default)]
    pub zones: Vec<ZoneState>,
    /// Version registry content.
    #[serde(default)]
    pub stacks: Vec<StackState>,
}

/// Record source, sink, and version registry over a JSON state file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    provider: MemoryProvider,
}

impl JsonStore {
    /// Loads the state file at `path` into an in-memory provider.
    pub fn open(path: &Path) -> CliResult<Self> {
        let raw = fs::read_to_string(path)?;
        let state: StateFile = serde_json::from_str(&raw)?;
        let provider = MemoryProvider::new();
        for zone in state.zones {
            provider.add_zone(&zone.name);
            for record in zone.records {
                provider.add_record(&zone.name, record);
            }
        }
        for stack in state.stacks {
            provider.add_stack(&stack.name, stack.versions);
        }
        Ok(Self {
            path: path.to_path_buf(),
            provider,
        })
    }

    /// Writes the provider's current content back to the state file.
    pub fn persist(&self) -> CliResult<()> {
        let mut zones: Vec<ZoneState> = self
            .provider
            .zones()
            .into_iter()
            .map(|(zone, records)| ZoneState {
                name: zone.name,
                records,
            })
            .collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));
        let mut stacks: Vec<StackState> = self
            .provider
            .stacks()
            .into_iter()
            .map(|(name, versions)| StackState { name, versions })
            .collect();
        stacks.sort_by(|a, b| a.name.cmp(&b.name));
        let state = StateFile { zones, stacks };
        fs::write(&self.path, serde_json::to_string_pretty(&state)?)?;
        Ok(())
    }
}

#[async_trait]
impl RecordSource for JsonStore {
    async fn zone(&self, domain: &str) -> Result<HostedZone, ApiError> {
        self.provider.zone(domain).await
    }

    async fn list_page(
        &self,
        zone: &HostedZone,
        cursor: Option<PageToken>,
    ) -> Result<RecordPage, ApiError> {
        self.provider.list_page(zone, cursor).await
    }
}

#[async_trait]
impl RecordSink for JsonStore {
    async fn apply(
        &self,
        zone: &HostedZone,
        comment: &str,
        changes: &[RecordChange],
    ) -> Result<(), ApiError> {
        self.provider.apply(zone, comment, changes).await?;
        self.persist()
            .map_err(|e| ApiError::Remote(format!("state file write failed: {e}")))
    }
}

#[async_trait]
impl VersionRegistry for JsonStore {
    async fn stack_versions(&self, stack_name: &str) -> Result<Vec<StackVersion>, ApiError> {
        self.provider.stack_versions(stack_name).await
    }
}
