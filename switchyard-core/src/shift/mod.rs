//! The traffic-shift engine.
//!
//! Four stages run in strict sequence over one domain name: snapshot the
//! current weights, allocate a candidate assignment for the requested
//! percentage, compensate integer rounding drift, and diff the result
//! into a minimal change batch. [`plan_shift`] front-ends the first three
//! stages and handles the degenerate single-version states.

pub mod allocate;
pub mod changeset;
pub mod compensate;
pub mod plan;
pub mod snapshot;

pub use allocate::allocate;
pub use changeset::{build_changes, NEW_RECORD_TTL};
pub use compensate::{compensate, Compensation};
pub use plan::{plan_shift, ShiftOutcome, TrafficPlan};
pub use snapshot::{read_weights, WeightSnapshot};
