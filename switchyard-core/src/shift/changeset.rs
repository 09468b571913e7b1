//! Change-set builder: diffing a final weight assignment against the
//! current record set.

use crate::domain::{ChangeAction, RecordChange, RecordType, RoutingRecord, VersionId};
use std::collections::BTreeMap;

/// TTL in seconds for records the builder synthesizes for a version that
/// had no record before.
pub const NEW_RECORD_TTL: u64 = 20;

/// Produces the minimal change batch realizing `new_weights`.
///
/// Existing records for the domain name are upserted only when their
/// weight actually changes; a record whose final weight is zero is
/// deleted instead of being upserted to zero. When the target ends up
/// with traffic but had no record, a fresh CNAME record pointing at
/// `lb_endpoint` is synthesized. An empty result means the record set
/// already matches and no batch should be submitted.
pub fn build_changes(
    dns_name: &str,
    target: &VersionId,
    lb_endpoint: &str,
    new_weights: &BTreeMap<VersionId, i64>,
    records: &[RoutingRecord],
) -> Vec<RecordChange> {
    let mut changes = Vec::new();
    let mut did_the_upsert = false;

    for r in records {
        if r.record_type != RecordType::Cname || r.name != dns_name {
            continue;
        }
        let w = new_weights.get(&r.set_identifier).copied().unwrap_or(0);
        if w > 0 {
            if r.weight != w {
                let mut updated = r.clone();
                updated.weight = w;
                changes.push(RecordChange {
                    action: ChangeAction::Upsert,
                    record: updated,
                });
            }
            if r.set_identifier == *target {
                // an up-to-date record also counts: no synthesis needed
                did_the_upsert = true;
            }
        } else {
            changes.push(RecordChange {
                action: ChangeAction::Delete,
                record: r.clone(),
            });
        }
    }

    let target_weight = new_weights.get(target).copied().unwrap_or(0);
    if target_weight > 0 && !did_the_upsert {
        changes.push(RecordChange {
            action: ChangeAction::Upsert,
            record: RoutingRecord {
                record_type: RecordType::Cname,
                name: dns_name.to_string(),
                set_identifier: target.clone(),
                weight: target_weight,
                ttl: NEW_RECORD_TTL,
                value: lb_endpoint.to_string(),
            },
        });
    }

    changes
}
