//! State-layer error types
//!
//! These errors surface at the crate boundary. Inside a block they are rare:
//! executors validate before mutating, so a failing store operation mid-block
//! indicates either storage trouble or an invariant violation, and invariant
//! violations are fatal by policy (a diverging node must halt, not limp on).

use lib_types::BlockHeight;
use thiserror::Error;

/// Result alias for state-layer operations
pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Historical version requested outside the retained window
    #[error("no state snapshot retained for height {height}")]
    SnapshotUnavailable { height: BlockHeight },

    /// Underlying storage failure (sled)
    #[error("storage failure: {0}")]
    Storage(String),

    /// Conservation or solvency audit failed after a commit
    #[error("state invariant violated: {0}")]
    InvariantViolated(String),

    /// Genesis document failed validation
    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),
}

impl From<sled::Error> for StateError {
    fn from(e: sled::Error) -> Self {
        StateError::Storage(e.to_string())
    }
}
