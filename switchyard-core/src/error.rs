//! Engine error types.

use thiserror::Error;

/// Errors produced by the weight engine.
///
/// `InvariantViolation` and `ResidualError` indicate a defect in the
/// engine itself, never a bad user request; callers must abort rather
/// than apply an inconsistent record set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShiftError {
    /// The requested percentage lies outside `0..=FULL_PERCENTAGE`.
    #[error("requested percentage {requested} is outside 0..={full} weight units")]
    PercentageOutOfRange {
        /// The out-of-range request, already in weight units.
        requested: i64,
        /// The configured full percentage in weight units.
        full: i64,
    },

    /// The final weight assignment does not sum to the fixed total.
    #[error("weight sum invariant violated: expected {expected}, got {actual}")]
    InvariantViolation {
        /// The fixed total the weights must sum to.
        expected: i64,
        /// The sum actually observed.
        actual: i64,
    },

    /// Rounding error survived a compensation pass that claimed success.
    #[error("compensation left a residual rounding error of {remaining}")]
    ResidualError {
        /// The uncompensated remainder.
        remaining: i64,
    },
}
