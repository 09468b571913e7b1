//! CLI error taxonomy.

use switchyard_api::ApiError;
use switchyard_core::error::ShiftError;
use thiserror::Error;

/// Errors surfaced to the operator.
///
/// Usage errors abort before any mutation. Engine invariant violations
/// and remote failures propagate unmodified; by the time either can
/// occur, no partial change has been applied (the sink is all-or-
/// nothing).
#[derive(Debug, Error)]
pub enum CliError {
    /// The request itself is wrong: unknown stack or version, a version
    /// without a domain, or an out-of-range percentage.
    #[error("{0}")]
    Usage(String),

    /// Record source/sink failure, including a missing hosted zone.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A defect in the weight engine, never a user error.
    #[error(transparent)]
    Shift(#[from] ShiftError),

    /// State file could not be read or written.
    #[error("state file error: {0}")]
    Io(#[from] std::io::Error),

    /// State file is not valid JSON for the expected schema.
    #[error("state file error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
