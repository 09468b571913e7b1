//! Shift planning: the state machine in front of allocation and
//! compensation.

use crate::domain::VersionId;
use crate::error::ShiftError;
use crate::shift::allocate::allocate;
use crate::shift::compensate::compensate;
use crate::shift::snapshot::WeightSnapshot;
use crate::FULL_PERCENTAGE;
use std::collections::BTreeMap;

/// Terminal outcome of a planned shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOutcome {
    /// The last live version was disabled; the whole weighted group for
    /// the domain name goes away.
    RecordRemoved,
    /// A weight assignment was produced.
    Applied {
        /// The percentage the caller asked for, in weight units.
        requested: i64,
        /// The percentage the target actually ends up with.
        achieved: i64,
        /// Whether compensation had to adjust the request because every
        /// other version was pinned at its minimum.
        adjusted: bool,
    },
}

/// A complete weight reassignment for one domain name, ready to be diffed
/// against the current record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficPlan {
    /// The version being shifted.
    pub target: VersionId,
    /// Weights before the shift.
    pub old_weights: BTreeMap<VersionId, i64>,
    /// Final weights after allocation and compensation.
    pub new_weights: BTreeMap<VersionId, i64>,
    /// Per-identifier `new - old` from the allocation stage.
    pub deltas: BTreeMap<VersionId, i64>,
    /// Per-identifier adjustments applied by the compensation stage.
    pub compensations: BTreeMap<VersionId, i64>,
    /// How the shift concluded.
    pub outcome: ShiftOutcome,
}

/// Plans a shift of `percentage` (in weight units) onto `target`.
///
/// Two degenerate states precede the general path. With no other live
/// version and a zero request, every weight is forced to zero and the
/// record group is reported as removed. With no other live version and a
/// positive request, there is nothing to redistribute from: the target is
/// promoted straight to [`FULL_PERCENTAGE`] and the gap is recorded as a
/// compensation on the target itself. Otherwise allocation runs with the
/// even-share delta and compensation reconciles whatever integer rounding
/// left over.
///
/// `version_order` maps identifiers to their version labels and decides
/// which versions absorb rounding drift (newest first).
pub fn plan_shift(
    snapshot: &WeightSnapshot,
    target: &VersionId,
    percentage: i64,
    version_order: &BTreeMap<VersionId, String>,
) -> Result<TrafficPlan, ShiftError> {
    if !(0..=FULL_PERCENTAGE).contains(&percentage) {
        return Err(ShiftError::PercentageOutOfRange {
            requested: percentage,
            full: FULL_PERCENTAGE,
        });
    }

    let old_weights = snapshot.weights.clone();

    if snapshot.partial_count == 0 && percentage == 0 {
        // disable the last remaining version
        let new_weights: BTreeMap<VersionId, i64> =
            old_weights.keys().map(|i| (i.clone(), 0)).collect();
        let deltas = old_weights.iter().map(|(i, &w)| (i.clone(), -w)).collect();
        return Ok(TrafficPlan {
            target: target.clone(),
            old_weights,
            new_weights,
            deltas,
            compensations: BTreeMap::new(),
            outcome: ShiftOutcome::RecordRemoved,
        });
    }

    let mut compensations = BTreeMap::new();
    let mut achieved = percentage;

    let delta = if snapshot.partial_count > 0 {
        (FULL_PERCENTAGE - achieved - snapshot.partial_sum) / snapshot.partial_count
    } else {
        // no other live version: promote the sole survivor to full
        // traffic and book the gap as a compensation on the target
        compensations.insert(target.clone(), FULL_PERCENTAGE - achieved);
        achieved = FULL_PERCENTAGE;
        0
    };

    let (mut new_weights, deltas) = allocate(delta, target, &snapshot.weights, achieved);

    let total: i64 = new_weights.values().sum();
    let error = FULL_PERCENTAGE - total;
    let mut adjusted = false;
    if error != 0 && error < FULL_PERCENTAGE {
        let result = compensate(
            error,
            target,
            &mut new_weights,
            &mut compensations,
            snapshot.partial_count,
            achieved,
            version_order,
        );
        achieved = result.percentage;
        adjusted = result.adjusted;
    }

    let total: i64 = new_weights.values().sum();
    if total != FULL_PERCENTAGE {
        return Err(ShiftError::InvariantViolation {
            expected: FULL_PERCENTAGE,
            actual: total,
        });
    }

    Ok(TrafficPlan {
        target: target.clone(),
        old_weights,
        new_weights,
        deltas,
        compensations,
        outcome: ShiftOutcome::Applied {
            requested: percentage,
            achieved,
            adjusted,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::snapshot::read_weights;
    use crate::domain::{RecordType, RoutingRecord};

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

    fn versions(entries: &[(&str, &str)]) -> BTreeMap<VersionId, String> {
        entries
            .iter()
            .map(|&(id, v)| (VersionId::from(id), v.to_string()))
            .collect()
    }

    fn snapshot(records: &[RoutingRecord], target: &VersionId) -> WeightSnapshot {
        read_weights(records, "myapp.example.org.", target, [])
    }

    #[test]
    fn last_version_disable_removes_the_record() {
        let records = vec![record("myapp-1", 200)];
        let target = VersionId::from("myapp-1");
        let order = versions(&[("myapp-1", "1")]);

        let plan = plan_shift(&snapshot(&records, &target), &target, 0, &order).unwrap();

        assert_eq!(plan.outcome, ShiftOutcome::RecordRemoved);
        assert!(plan.new_weights.values().all(|&w| w == 0));
        assert_eq!(plan.deltas[&target], -200);
    }

    #[test]
    fn sole_survivor_is_promoted_to_full_traffic() {
        let records = vec![record("myapp-1", 200)];
        let target = VersionId::from("myapp-1");
        let order = versions(&[("myapp-1", "1")]);

        let plan = plan_shift(&snapshot(&records, &target), &target, 50, &order).unwrap();

        assert_eq!(plan.new_weights[&target], 200);
        assert_eq!(plan.compensations[&target], 150);
        assert_eq!(
            plan.outcome,
            ShiftOutcome::Applied {
                requested: 50,
                achieved: 200,
                adjusted: false,
            }
        );
    }

    #[test]
    fn single_survivor_at_full_stays_unchanged() {
        let records = vec![record("myapp-1", 200)];
        let target = VersionId::from("myapp-1");
        let order = versions(&[("myapp-1", "1")]);

        let plan = plan_shift(&snapshot(&records, &target), &target, 200, &order).unwrap();

        assert_eq!(plan.new_weights[&target], 200);
        assert_eq!(plan.deltas[&target], 0);
        assert_eq!(plan.compensations.get(&target), Some(&0));
    }

    #[test]
    fn full_cutover_disables_all_other_versions() {
        let records = vec![
            record("myapp-1", 100),
            record("myapp-2", 60),
            record("myapp-3", 40),
        ];
        let target = VersionId::from("myapp-3");
        let order = versions(&[("myapp-1", "1"), ("myapp-2", "2"), ("myapp-3", "3")]);

        let plan = plan_shift(&snapshot(&records, &target), &target, 200, &order).unwrap();

        assert_eq!(plan.new_weights[&target], 200);
        assert_eq!(plan.new_weights[&VersionId::from("myapp-1")], 0);
        assert_eq!(plan.new_weights[&VersionId::from("myapp-2")], 0);
        assert_eq!(plan.new_weights.values().sum::<i64>(), 200);
    }

    #[test]
    fn rounding_drift_is_compensated_on_the_newest_version() {
        // delta = (200 - 67 - 80) / 2 = 26, leaving one unit of error
        let records = vec![
            record("myapp-1", 120),
            record("myapp-2", 60),
            record("myapp-3", 20),
        ];
        let target = VersionId::from("myapp-1");
        let order = versions(&[("myapp-1", "1"), ("myapp-2", "2"), ("myapp-3", "3")]);

        let plan = plan_shift(&snapshot(&records, &target), &target, 67, &order).unwrap();

        assert_eq!(plan.new_weights[&target], 67);
        assert_eq!(plan.new_weights[&VersionId::from("myapp-2")], 86);
        assert_eq!(plan.new_weights[&VersionId::from("myapp-3")], 47);
        assert_eq!(plan.compensations[&VersionId::from("myapp-3")], 1);
        assert_eq!(plan.new_weights.values().sum::<i64>(), 200);

        // the two non-targets moved by amounts differing by the step size
        let d2 = plan.new_weights[&VersionId::from("myapp-2")] - 60;
        let d3 = plan.new_weights[&VersionId::from("myapp-3")] - 20;
        assert!((d2 - d3).abs() <= 1);
    }

    #[test]
    fn surrendering_adjusts_the_target_percentage() {
        let records = vec![
            record("myapp-1", 120),
            record("myapp-2", 60),
            record("myapp-3", 20),
        ];
        let target = VersionId::from("myapp-1");
        let order = versions(&[("myapp-1", "1"), ("myapp-2", "2"), ("myapp-3", "3")]);

        let plan = plan_shift(&snapshot(&records, &target), &target, 199, &order).unwrap();

        match plan.outcome {
            ShiftOutcome::Applied {
                requested,
                achieved,
                adjusted,
            } => {
                assert_eq!(requested, 199);
                assert!(adjusted);
                assert!(achieved < requested);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(plan.new_weights.values().sum::<i64>(), 200);
        assert!(plan.new_weights[&VersionId::from("myapp-2")] >= 1);
        assert!(plan.new_weights[&VersionId::from("myapp-3")] >= 1);
    }

    #[test]
    fn percentage_outside_the_scale_is_rejected() {
        let records = vec![record("myapp-1", 200)];
        let target = VersionId::from("myapp-1");
        let order = versions(&[("myapp-1", "1")]);

        let err = plan_shift(&snapshot(&records, &target), &target, 201, &order).unwrap_err();
        assert!(matches!(err, ShiftError::PercentageOutOfRange { .. }));
    }
}
