//! Nested sub-models active while their state is current.

use thiserror::Error;

/// Failure reported by a refinement.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct RefinementError(pub String);

/// Executable sub-model refining a state.
///
/// The surrounding engine schedules `fire` and `postfire`; the controller
/// itself only calls `initialize`, when a committed transition resets the
/// destination's refinement.
pub trait Refinement {
    fn initialize(&mut self) -> Result<(), RefinementError>;

    fn fire(&mut self) -> Result<(), RefinementError> {
        Ok(())
    }

    fn postfire(&mut self) -> Result<bool, RefinementError> {
        Ok(true)
    }
}
