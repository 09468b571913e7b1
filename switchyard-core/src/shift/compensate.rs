//! Rounding compensation engine.

use crate::domain::VersionId;
use std::collections::BTreeMap;

/// Result of a compensation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compensation {
    /// The percentage actually achieved for the target, in weight units.
    pub percentage: i64,
    /// Whether the requested percentage had to be adjusted because every
    /// other version was already pinned at its minimum.
    pub adjusted: bool,
}

/// Redistributes the integer rounding error left over by allocation.
///
/// The error is split into a per-version step of magnitude at least one,
/// rounded away from zero, so each applied step shrinks the error and the
/// pass cannot loop forever. Candidates are all identifiers except the
/// target, visited in descending version order so that the most recently
/// deployed versions absorb the drift and long-lived stable versions are
/// left alone. Candidates that a step would drive to zero or below are
/// skipped (the floor holds during compensation too), as are candidates
/// already at zero: a disabled version never comes back as a side
/// effect.
///
/// If the error cannot be placed anywhere, the remainder is shifted onto
/// the target's own percentage and `adjusted` is set so the caller can
/// warn that the exact request was not honored. This is the only path by
/// which the achieved percentage differs from the requested one.
///
/// Precondition: `partial_count > 0`. With no live non-target versions
/// the allocation delta was already zero and any residual belongs to the
/// target directly.
pub fn compensate(
    mut error: i64,
    target: &VersionId,
    weights: &mut BTreeMap<VersionId, i64>,
    compensations: &mut BTreeMap<VersionId, i64>,
    partial_count: i64,
    percentage: i64,
    version_order: &BTreeMap<VersionId, String>,
) -> Compensation {
    debug_assert!(partial_count > 0);
    debug_assert!(error != 0);

    // ceiling of |error| / partial_count, sign-preserving: the step keeps
    // a magnitude of at least one unit so every application shrinks the
    // error and the pass terminates
    let magnitude = (error.abs() + partial_count - 1) / partial_count;
    let part = if error > 0 { magnitude } else { -magnitude };

    let mut candidates: Vec<VersionId> = weights
        .keys()
        .filter(|ident| *ident != target)
        .cloned()
        .collect();
    // newest version first; identifier as a deterministic tie-break
    candidates.sort_by(|a, b| {
        let va = version_order.get(a).map(String::as_str).unwrap_or("");
        let vb = version_order.get(b).map(String::as_str).unwrap_or("");
        vb.cmp(va).then_with(|| a.cmp(b))
    });

    for ident in candidates {
        let w = weights[&ident];
        if w <= 0 {
            // a disabled version never picks up weight through
            // compensation, only the target can bring it back
            continue;
        }
        let nw = w + part;
        if nw <= 0 {
            // do not take the traffic away from minimal-weight versions
            continue;
        }
        weights.insert(ident.clone(), nw);
        compensations.insert(ident, part);
        error -= part;
        if error == 0 {
            break;
        }
    }

    if error != 0 {
        // every other version is pinned; the target absorbs the rest
        let adjusted_percentage = percentage + error;
        compensations.insert(target.clone(), error);
        weights.insert(target.clone(), adjusted_percentage);
        return Compensation {
            percentage: adjusted_percentage,
            adjusted: true,
        };
    }

    Compensation {
        percentage,
        adjusted: false,
    }
}
