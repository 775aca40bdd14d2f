//! Boundary to the external expression evaluator.

use crate::core::Value;
use crate::effects::scope::Scope;
use crate::machine::GuardContext;
use thiserror::Error;

/// Failures reported while evaluating a guard or an action value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvaluationError {
    #[error("Unresolved identifier '{name}'")]
    Unresolved { name: String },

    #[error("Input '{name}' has no token in this round")]
    Absent { name: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Evaluation failed: {0}")]
    Runtime(String),

    /// Fault raised under the model-error convention (e.g. a failed
    /// assertion); eligible for recovery by the controller.
    #[error("Model error: {0}")]
    Model(String),
}

impl EvaluationError {
    pub fn is_model_error(&self) -> bool {
        matches!(self, Self::Model(_))
    }
}

/// Evaluates guard and action expression strings.
///
/// Guards get a [`GuardContext`] rather than a bare scope so that every
/// relational sub-expression can be reported through
/// [`GuardContext::compare`], in parse order.
pub trait Evaluator {
    fn evaluate_guard(
        &self,
        expression: &str,
        context: &mut GuardContext<'_>,
    ) -> Result<bool, EvaluationError>;

    fn evaluate_value(&self, expression: &str, scope: &Scope) -> Result<Value, EvaluationError>;
}

/// Evaluator for machines built only from predicates and literals.
///
/// Every expression fails with a parse error.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEvaluator;

impl Evaluator for NoEvaluator {
    fn evaluate_guard(
        &self,
        expression: &str,
        _context: &mut GuardContext<'_>,
    ) -> Result<bool, EvaluationError> {
        Err(EvaluationError::Parse(format!(
            "no expression evaluator configured for guard '{expression}'"
        )))
    }

    fn evaluate_value(&self, expression: &str, _scope: &Scope) -> Result<Value, EvaluationError> {
        Err(EvaluationError::Parse(format!(
            "no expression evaluator configured for '{expression}'"
        )))
    }
}
