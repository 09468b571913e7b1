//! Weight allocator.

use crate::domain::VersionId;
use crate::FULL_PERCENTAGE;
use std::collections::BTreeMap;

/// Computes a candidate weight assignment for the requested percentage.
///
/// The target gets `percentage` unconditionally. On a full cutover every
/// other version is disabled. Otherwise every other version that carries
/// traffic absorbs `delta`, the caller's even share of the remaining
/// capacity, but is never pushed below one unit; versions already at zero
/// stay at zero. Returns the new assignment plus a per-identifier delta
/// map (`new - old`) for reporting.
///
/// Integer rounding in `delta` may leave the total off from
/// [`FULL_PERCENTAGE`]; reconciling that is the compensation stage's job.
pub fn allocate(
    delta: i64,
    target: &VersionId,
    weights: &BTreeMap<VersionId, i64>,
    percentage: i64,
) -> (BTreeMap<VersionId, i64>, BTreeMap<VersionId, i64>) {
    let mut new_weights = BTreeMap::new();
    let mut deltas = BTreeMap::new();

    for (ident, &w) in weights {
        let n = if ident == target {
            percentage
        } else if percentage == FULL_PERCENTAGE {
            // 100% of the traffic is ordered for the target version
            0
        } else if w > 0 {
            // do not allow a live version to be pushed below one unit
            (w + delta).max(1)
        } else {
            // do not touch versions that were not getting traffic before
            0
        };
        new_weights.insert(ident.clone(), n);
        deltas.insert(ident.clone(), n - w);
    }

    (new_weights, deltas)
}
