//! Build errors for machine and transition builders.

use crate::controller::FiringFault;
use crate::validation::StructuralViolation;
use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(name) before .build()")]
    MissingInitialState,

    #[error("Transition source state not specified. Call .from(name)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(name)")]
    MissingToState,

    #[error("State '{0}' is declared more than once")]
    DuplicateState(String),

    #[error("Unknown state '{0}'")]
    UnknownState(String),

    #[error(transparent)]
    Structural(#[from] FiringFault),

    #[error("Machine violates {} structural rule(s): {}", .0.len(), join(.0))]
    Invalid(Vec<StructuralViolation>),
}

fn join(violations: &[StructuralViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
