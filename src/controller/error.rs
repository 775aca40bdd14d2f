//! Faults raised by the firing protocol and by structural edits.

use crate::effects::EvaluationError;
use crate::machine::RefinementError;
use thiserror::Error;

/// Phase of the controller's firing cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Between cycles.
    #[default]
    Idle,
    /// At least one evaluate pass ran; awaiting commit.
    Evaluating,
    /// Inside `postfire`.
    Committing,
}

/// Errors that abort a firing cycle or a structural edit.
///
/// A fault that aborts a cycle leaves the current state, relation histories
/// and outputs as they were before the cycle began.
#[derive(Debug, Error)]
pub enum FiringFault {
    #[error("Multiple enabled transitions from state '{state}': {}", .transitions.join(", "))]
    MultipleEnabledTransitions {
        state: String,
        transitions: Vec<String>,
    },

    #[error("State '{state}' has no refinement to reset")]
    MissingRefinement { state: String },

    #[error("Unresolved reference '{name}'")]
    UnresolvedReference { name: String },

    #[error("Evaluation failed in transition '{transition}': {source}")]
    GuardEvaluation {
        transition: String,
        #[source]
        source: EvaluationError,
    },

    #[error("Structural constraint violated: {0}")]
    StructuralConstraintViolation(String),

    #[error("Refinement of state '{state}' failed: {source}")]
    Refinement {
        state: String,
        #[source]
        source: RefinementError,
    },

    #[error("Controller has not been initialized")]
    NotInitialized,

    #[error("'{operation}' is not allowed in the {phase:?} phase")]
    ProtocolViolation {
        operation: &'static str,
        phase: Phase,
    },

    #[error("Evaluate phase exceeded the limit of {limit} passes")]
    PassLimitExceeded { limit: usize },
}

impl FiringFault {
    /// Map an evaluator failure raised while evaluating `transition`.
    pub fn from_evaluation(transition: &str, error: EvaluationError) -> Self {
        match error {
            EvaluationError::Unresolved { name } => Self::UnresolvedReference { name },
            source => Self::GuardEvaluation {
                transition: transition.to_string(),
                source,
            },
        }
    }

    /// Guard fault raised under the model-error convention.
    pub fn is_model_error(&self) -> bool {
        matches!(self, Self::GuardEvaluation { source, .. } if source.is_model_error())
    }

    /// Faults a recovery handler is offered before they propagate.
    pub fn is_recoverable(&self) -> bool {
        self.is_model_error() || matches!(self, Self::MultipleEnabledTransitions { .. })
    }

    pub(crate) fn structural(message: impl Into<String>) -> Self {
        Self::StructuralConstraintViolation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_identifiers_become_unresolved_references() {
        let fault = FiringFault::from_evaluation(
            "A->B",
            EvaluationError::Unresolved {
                name: "speed".to_string(),
            },
        );
        assert!(matches!(fault, FiringFault::UnresolvedReference { ref name } if name == "speed"));
    }

    #[test]
    fn model_errors_are_recoverable() {
        let fault =
            FiringFault::from_evaluation("A->B", EvaluationError::Model("assertion".to_string()));
        assert!(fault.is_model_error());
        assert!(fault.is_recoverable());

        let fault = FiringFault::from_evaluation("A->B", EvaluationError::Type("bad".to_string()));
        assert!(!fault.is_recoverable());
    }

    #[test]
    fn multiple_enabled_message_lists_transitions() {
        let fault = FiringFault::MultipleEnabledTransitions {
            state: "A".to_string(),
            transitions: vec!["t1".to_string(), "t2".to_string()],
        };
        assert!(fault.is_recoverable());
        assert_eq!(
            fault.to_string(),
            "Multiple enabled transitions from state 'A': t1, t2"
        );
    }
}
