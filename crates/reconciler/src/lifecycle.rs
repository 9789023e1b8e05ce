//! Lifecycle state of one managed object
//!
//! ```text
//! Absent --create--> Creating --ok--> Present
//! Present --update--> Updating --ok--> Present
//! Present --delete--> Deleting --ok or 404--> Absent
//! Present --read 404--> Absent
//! ```
//!
//! A failed create falls back to `Absent`; a failed update or delete falls
//! back to `Present` and holds the last observed state.

use thiserror::Error;

/// Where an object is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not in NetBox, or no longer tracked
    Absent,
    /// Create in flight
    Creating,
    /// Exists and is tracked
    Present,
    /// Update in flight
    Updating,
    /// Delete in flight
    Deleting,
}

/// Lifecycle operation a phase can start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// NetBox answered 404
    NotFound,
    Failed,
}

/// An operation the current phase does not allow
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {operation:?} an object in phase {phase:?}")]
pub struct TransitionError {
    pub phase: Phase,
    pub operation: Operation,
}

impl Phase {
    /// Enter the phase for `operation`
    pub fn begin(self, operation: Operation) -> Result<Phase, TransitionError> {
        match (self, operation) {
            (Phase::Absent, Operation::Create) => Ok(Phase::Creating),
            (Phase::Present, Operation::Read) => Ok(Phase::Present),
            (Phase::Present, Operation::Update) => Ok(Phase::Updating),
            (Phase::Present, Operation::Delete) => Ok(Phase::Deleting),
            (phase, operation) => Err(TransitionError { phase, operation }),
        }
    }

    /// Leave the in-flight phase
    pub fn finish(self, outcome: Outcome) -> Phase {
        match (self, outcome) {
            (Phase::Creating, Outcome::Succeeded) => Phase::Present,
            (Phase::Creating, _) => Phase::Absent,
            (Phase::Present, Outcome::NotFound) => Phase::Absent,
            (Phase::Deleting, Outcome::Succeeded | Outcome::NotFound) => Phase::Absent,
            // A 404 during update is surfaced as an error; the record stays
            (Phase::Updating | Phase::Deleting | Phase::Present, _) => Phase::Present,
            (Phase::Absent, _) => Phase::Absent,
        }
    }

    /// Whether an object in this phase is tracked
    pub fn is_tracked(self) -> bool {
        !matches!(self, Phase::Absent)
    }
}
