//! Weight snapshot reader.

use crate::domain::{RecordType, RoutingRecord, VersionId};
use std::collections::BTreeMap;

/// The current weight distribution of one domain name, together with the
/// aggregates over the "partial set": every identifier other than the
/// shift target that currently carries traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightSnapshot {
    /// Weight per identifier, total over the whole known identifier
    /// universe (identifiers without a record map to zero).
    pub weights: BTreeMap<VersionId, i64>,
    /// Number of non-target identifiers with weight above zero.
    pub partial_count: i64,
    /// Weight sum over those identifiers.
    pub partial_sum: i64,
}

/// Scans a record set and extracts the weights for `dns_name`.
///
/// Only CNAME records whose name matches exactly are considered. Versions
/// that currently get no traffic are excluded from the partial aggregates
/// so that redistributing weights never puts traffic back on a disabled
/// version. The resulting map also contains `target` and every identifier
/// in `all_identifiers`, defaulting to zero, so later stages can treat it
/// as total.
pub fn read_weights<'a, I>(
    records: &[RoutingRecord],
    dns_name: &str,
    target: &VersionId,
    all_identifiers: I,
) -> WeightSnapshot
where
    I: IntoIterator<Item = &'a VersionId>,
{
    let mut weights = BTreeMap::new();
    let mut partial_count = 0;
    let mut partial_sum = 0;

    for r in records {
        if r.record_type == RecordType::Cname && r.name == dns_name {
            let w = r.weight.max(0);
            weights.insert(r.set_identifier.clone(), w);
            if r.set_identifier != *target && w > 0 {
                partial_sum += w;
                partial_count += 1;
            }
        }
    }

    weights.entry(target.clone()).or_insert(0);
    for ident in all_identifiers {
        weights.entry(ident.clone()).or_insert(0);
    }

    WeightSnapshot {
        weights,
        partial_count,
        partial_sum,
    }
}
