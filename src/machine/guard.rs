//! Transition guards and the context they evaluate in.
//!
//! A guard decides whether its transition is enabled. While deciding, it
//! reports every relational sub-expression (`x > 5`, `level == 0`) through
//! [`GuardContext::compare`]. The context records each relation's
//! classification and signed distance into the transition's
//! [`RelationList`], which is what level-crossing detection works on.

use crate::core::{RelationList, RelationType, Value};
use crate::effects::{EvaluationError, Evaluator, Scope};
use std::fmt;
use std::sync::Arc;

/// Compiled guard callable.
pub type GuardPredicate =
    Arc<dyn Fn(&mut GuardContext<'_>) -> Result<bool, EvaluationError> + Send + Sync>;

/// Boolean predicate gating a transition.
///
/// # Example
///
/// ```rust
/// use modal_fsm::core::{RelationList, RelationType};
/// use modal_fsm::effects::{NoEvaluator, Scope};
/// use modal_fsm::machine::{Comparison, Guard, GuardContext};
///
/// let guard = Guard::predicate(|ctx| {
///     let x = ctx.number("x")?;
///     Ok(ctx.compare(x, Comparison::Greater, 5.0))
/// });
///
/// let scope = Scope::new().with_variable("x", 7.0);
/// let mut relations = RelationList::new();
/// let mut ctx = GuardContext::new(&scope, &mut relations, 0.0);
///
/// assert_eq!(guard.evaluate(&NoEvaluator, &mut ctx), Ok(true));
/// assert_eq!(relations.get(0).unwrap().current_type(), RelationType::GreaterThan);
/// ```
#[derive(Clone, Default)]
pub enum Guard {
    /// Always enabled.
    #[default]
    Always,
    /// Expression string handed to the configured [`Evaluator`].
    Expression(String),
    /// Compiled callable.
    Predicate(GuardPredicate),
}

impl Guard {
    pub fn expression(expression: impl Into<String>) -> Self {
        Self::Expression(expression.into())
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&mut GuardContext<'_>) -> Result<bool, EvaluationError> + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Evaluate the guard, recording relations into the context.
    pub fn evaluate(
        &self,
        evaluator: &dyn Evaluator,
        context: &mut GuardContext<'_>,
    ) -> Result<bool, EvaluationError> {
        match self {
            Self::Always => Ok(true),
            Self::Expression(expression) => evaluator.evaluate_guard(expression, context),
            Self::Predicate(predicate) => predicate(context),
        }
    }

    /// Short human-readable form for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Always => "true".to_string(),
            Self::Expression(expression) => expression.clone(),
            Self::Predicate(_) => "<predicate>".to_string(),
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Guard").field(&self.describe()).finish()
    }
}

/// Relational operator of a guard sub-expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }

    /// Classify `difference = lhs - rhs` and decide the comparison.
    fn classify(self, difference: f64) -> (RelationType, bool) {
        let side = if difference < 0.0 {
            RelationType::LessThan
        } else {
            RelationType::GreaterThan
        };
        match self {
            Self::Equal => (RelationType::EqualInequal, difference == 0.0),
            Self::NotEqual => (RelationType::EqualInequal, difference != 0.0),
            Self::Less => (side, difference < 0.0),
            Self::LessOrEqual => (side, difference <= 0.0),
            Self::Greater => (side, difference > 0.0),
            Self::GreaterOrEqual => (side, difference >= 0.0),
        }
    }
}

/// Evaluation context handed to a guard for one evaluation round.
///
/// Relations are addressed by the order in which the guard reports them: the
/// first call to [`compare`](Self::compare) or [`boolean`](Self::boolean)
/// updates relation 0, the second relation 1, and so on. Relations are
/// appended on the first round and updated in place afterwards.
pub struct GuardContext<'a> {
    scope: &'a Scope,
    relations: &'a mut RelationList,
    cursor: usize,
    tolerance: f64,
}

impl<'a> GuardContext<'a> {
    /// Differences with magnitude below `tolerance` count as exactly on the
    /// threshold.
    pub fn new(scope: &'a Scope, relations: &'a mut RelationList, tolerance: f64) -> Self {
        Self {
            scope,
            relations,
            cursor: 0,
            tolerance,
        }
    }

    pub fn scope(&self) -> &Scope {
        self.scope
    }

    pub fn lookup(&self, name: &str) -> Result<Value, EvaluationError> {
        self.scope.lookup(name)
    }

    pub fn number(&self, name: &str) -> Result<f64, EvaluationError> {
        self.scope.number(name)
    }

    pub fn flag(&self, name: &str) -> Result<bool, EvaluationError> {
        self.scope.flag(name)
    }

    pub fn is_present(&self, port: &str, channel: usize) -> bool {
        self.scope.is_present(port, channel)
    }

    /// Evaluate and record the relation `lhs op rhs`.
    pub fn compare(&mut self, lhs: f64, op: Comparison, rhs: f64) -> bool {
        let mut difference = lhs - rhs;
        if difference.abs() < self.tolerance {
            difference = 0.0;
        }
        let (relation_type, result) = op.classify(difference);
        self.record(relation_type, difference);
        result
    }

    /// Record a boolean leaf of the guard and return it unchanged.
    pub fn boolean(&mut self, value: bool) -> bool {
        let relation_type = if value {
            RelationType::True
        } else {
            RelationType::False
        };
        self.record(relation_type, 0.0);
        value
    }

    /// Number of relations reported so far in this round.
    pub fn relations_recorded(&self) -> usize {
        self.cursor
    }

    fn record(&mut self, relation_type: RelationType, difference: f64) {
        if self
            .relations
            .set_relation(self.cursor, relation_type, difference)
            .is_err()
        {
            self.relations.add_relation(relation_type, difference);
        }
        self.cursor += 1;
    }
}
