//! In-memory provider backing tests and the file-based CLI store.

use crate::{ApiError, HostedZone, PageToken, RecordPage, RecordSink, RecordSource, VersionRegistry};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use switchyard_core::domain::{ChangeAction, RecordChange, RoutingRecord, StackVersion};

const DEFAULT_PAGE_SIZE: usize = 100;

/// An in-memory record source, sink, and version registry.
///
/// Listing is genuinely paginated so callers exercise the same
/// continuation path a remote source requires, and change batches apply
/// all-or-nothing: the batch is validated against a copy of the zone and
/// committed only when every entry is applicable.
#[derive(Debug)]
pub struct MemoryProvider {
    zones: DashMap<String, Zone>,
    stacks: DashMap<String, Vec<StackVersion>>,
    next_zone_id: AtomicUsize,
    page_size: usize,
}

#[derive(Debug, Clone)]
struct Zone {
    id: String,
    records: Vec<RoutingRecord>,
}

impl MemoryProvider {
    /// Creates an empty provider with the default page size.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Creates an empty provider that lists at most `page_size` records
    /// per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            zones: DashMap::new(),
            stacks: DashMap::new(),
            next_zone_id: AtomicUsize::new(1),
            page_size: page_size.max(1),
        }
    }

    /// Registers a hosted zone and returns its handle.
    pub fn add_zone(&self, name: &str) -> HostedZone {
        let id = format!("zone-{}", self.next_zone_id.fetch_add(1, Ordering::Relaxed));
        self.zones.insert(
            name.to_string(),
            Zone {
                id: id.clone(),
                records: Vec::new(),
            },
        );
        HostedZone {
            id,
            name: name.to_string(),
        }
    }

    /// Adds a record to an existing zone. Panics if the zone is missing;
    /// only test setup calls this.
    pub fn add_record(&self, zone_name: &str, record: RoutingRecord) {
        self.zones
            .get_mut(zone_name)
            .expect("zone must be registered before adding records")
            .records
            .push(record);
    }

    /// Registers the deployed versions of a stack, newest first.
    pub fn add_stack(&self, stack_name: &str, versions: Vec<StackVersion>) {
        self.stacks.insert(stack_name.to_string(), versions);
    }

    /// Current records of a zone, if the zone exists.
    pub fn zone_records(&self, zone_name: &str) -> Option<Vec<RoutingRecord>> {
        self.zones.get(zone_name).map(|z| z.records.clone())
    }

    /// Snapshot of every zone with its records, for persistence.
    pub fn zones(&self) -> Vec<(HostedZone, Vec<RoutingRecord>)> {
        self.zones
            .iter()
            .map(|entry| {
                (
                    HostedZone {
                        id: entry.value().id.clone(),
                        name: entry.key().clone(),
                    },
                    entry.value().records.clone(),
                )
            })
            .collect()
    }

    /// Snapshot of every registered stack, for persistence.
    pub fn stacks(&self) -> Vec<(String, Vec<StackVersion>)> {
        self.stacks
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn same_record_key(a: &RoutingRecord, b: &RoutingRecord) -> bool {
    a.record_type == b.record_type && a.name == b.name && a.set_identifier == b.set_identifier
}

fn apply_to(records: &mut Vec<RoutingRecord>, changes: &[RecordChange]) -> Result<(), ApiError> {
    for change in changes {
        match change.action {
            ChangeAction::Upsert => {
                if change.record.weight < 0 {
                    return Err(ApiError::Remote(format!(
                        "invalid weight {} for record set {}",
                        change.record.weight, change.record.set_identifier
                    )));
                }
                match records.iter_mut().find(|r| same_record_key(r, &change.record)) {
                    Some(existing) => *existing = change.record.clone(),
                    None => records.push(change.record.clone()),
                }
            }
            ChangeAction::Delete => {
                let before = records.len();
                records.retain(|r| !same_record_key(r, &change.record));
                if records.len() == before {
                    return Err(ApiError::Remote(format!(
                        "tried to delete a record set that does not exist: {}",
                        change.record.set_identifier
                    )));
                }
            }
        }
    }
    Ok(())
}

#[async_trait]
impl RecordSource for MemoryProvider {
    async fn zone(&self, domain: &str) -> Result<HostedZone, ApiError> {
        self.zones
            .get(domain)
            .map(|z| HostedZone {
                id: z.id.clone(),
                name: domain.to_string(),
            })
            .ok_or_else(|| ApiError::ZoneNotFound(domain.to_string()))
    }

    async fn list_page(
        &self,
        zone: &HostedZone,
        cursor: Option<PageToken>,
    ) -> Result<RecordPage, ApiError> {
        let z = self
            .zones
            .get(&zone.name)
            .ok_or_else(|| ApiError::ZoneNotFound(zone.name.clone()))?;
        let start = cursor.map(|t| t.0).unwrap_or(0);
        let end = (start + self.page_size).min(z.records.len());
        let next = (end < z.records.len()).then_some(PageToken(end));
        Ok(RecordPage {
            records: z.records[start..end].to_vec(),
            next,
        })
    }
}

#[async_trait]
impl RecordSink for MemoryProvider {
    async fn apply(
        &self,
        zone: &HostedZone,
        _comment: &str,
        changes: &[RecordChange],
    ) -> Result<(), ApiError> {
        let mut z = self
            .zones
            .get_mut(&zone.name)
            .ok_or_else(|| ApiError::ZoneNotFound(zone.name.clone()))?;
        // stage on a copy so a failing batch leaves the zone untouched
        let mut staged = z.records.clone();
        apply_to(&mut staged, changes)?;
        z.records = staged;
        Ok(())
    }
}

#[async_trait]
impl VersionRegistry for MemoryProvider {
    async fn stack_versions(&self, stack_name: &str) -> Result<Vec<StackVersion>, ApiError> {
        Ok(self
            .stacks
            .get(stack_name)
            .map(|v| v.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list_complete;
    use switchyard_core::domain::{RecordType, VersionId};

    fn record(id: &str, weight: i64) -> RoutingRecord {
        RoutingRecord {
            record_type: RecordType::Cname,
            name: "myapp.example.org.".to_string(),
            set_identifier: VersionId::from(id),
            weight,
            ttl: 20,
            value: format!("{id}-lb.example.org"),
        }
    }

    #[tokio::test]
    async fn listing_pages_through_the_whole_zone() {
        let provider = MemoryProvider::with_page_size(2);
        let zone = provider.add_zone("example.org");
        for i in 0..5 {
            provider.add_record("example.org", record(&format!("myapp-{i}"), 40));
        }

        let first = provider.list_page(&zone, None).await.unwrap();
        assert_eq!(first.records.len(), 2);
        assert!(first.next.is_some());

        let all = list_complete(&provider, &zone).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn unknown_zone_is_a_not_found_error() {
        let provider = MemoryProvider::new();
        let err = provider.zone("missing.org").await.unwrap_err();
        assert_eq!(err, ApiError::ZoneNotFound("missing.org".to_string()));
    }

    #[tokio::test]
    async fn a_failing_batch_applies_nothing() {
        let provider = MemoryProvider::new();
        let zone = provider.add_zone("example.org");
        provider.add_record("example.org", record("myapp-1", 200));

        let changes = vec![
            RecordChange {
                action: ChangeAction::Upsert,
                record: record("myapp-1", 100),
            },
            RecordChange {
                action: ChangeAction::Delete,
                record: record("myapp-9", 0),
            },
        ];
        let err = provider.apply(&zone, "test", &changes).await.unwrap_err();
        assert!(matches!(err, ApiError::Remote(_)));

        // the upsert preceding the bad delete must not have stuck
        let records = provider.zone_records("example.org").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].weight, 200);
    }

    #[tokio::test]
    async fn upsert_replaces_in_place_and_delete_removes() {
        let provider = MemoryProvider::new();
        let zone = provider.add_zone("example.org");
        provider.add_record("example.org", record("myapp-1", 120));
        provider.add_record("example.org", record("myapp-2", 80));

        let changes = vec![
            RecordChange {
                action: ChangeAction::Upsert,
                record: record("myapp-1", 200),
            },
            RecordChange {
                action: ChangeAction::Delete,
                record: record("myapp-2", 80),
            },
        ];
        provider.apply(&zone, "test", &changes).await.unwrap();

        let records = provider.zone_records("example.org").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].set_identifier, VersionId::from("myapp-1"));
        assert_eq!(records[0].weight, 200);
    }
}
