//! Switchyard core functionality.
//!
//! This crate contains the domain models and the weight-allocation engine
//! that power Switchyard traffic shifts: reading a weight snapshot from a
//! routing record set, computing a new weight assignment for a requested
//! traffic percentage, compensating integer rounding drift, and diffing
//! the result into a minimal change batch.

pub mod domain;
pub mod error;
pub mod shift;

/// Number of weight units per percent of traffic. A resolution of 2 gives
/// 0.5% granularity.
pub const PERCENT_RESOLUTION: i64 = 2;

/// The fixed total that the weights of a routing group must sum to
/// whenever at least one version carries traffic.
pub const FULL_PERCENTAGE: i64 = PERCENT_RESOLUTION * 100;
