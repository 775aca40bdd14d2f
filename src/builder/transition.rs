//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::effects::EvaluationError;
use crate::machine::{Action, Guard, GuardContext, TransitionConfig, ValueExpr};

/// A transition between two states named but not yet resolved.
#[derive(Clone, Debug)]
pub struct TransitionDecl {
    pub from: String,
    pub to: String,
    pub config: TransitionConfig,
}

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use modal_fsm::builder::TransitionBuilder;
/// use modal_fsm::machine::{Comparison, ValueExpr};
///
/// let decl = TransitionBuilder::new()
///     .from("Cruise")
///     .to("Brake")
///     .preemptive()
///     .when(|ctx| {
///         let gap = ctx.number("gap")?;
///         Ok(ctx.compare(gap, Comparison::Less, 5.0))
///     })
///     .output("brake", ValueExpr::literal(true))
///     .build()
///     .unwrap();
///
/// assert!(decl.config.preemptive);
/// assert_eq!(decl.config.actions.len(), 1);
/// ```
#[derive(Default)]
pub struct TransitionBuilder {
    from: Option<String>,
    to: Option<String>,
    config: TransitionConfig,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Name the transition; defaults to `from->to`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.config.guard = guard;
        self
    }

    /// Guard given as an expression for the controller's evaluator.
    pub fn expression(self, expression: impl Into<String>) -> Self {
        self.guard(Guard::expression(expression))
    }

    /// Add a guard using a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&mut GuardContext<'_>) -> Result<bool, EvaluationError> + Send + Sync + 'static,
    {
        self.guard(Guard::predicate(predicate))
    }

    pub fn preemptive(mut self) -> Self {
        self.config.preemptive = true;
        self
    }

    /// Reinitialize the destination's refinement on entry.
    pub fn reset(mut self) -> Self {
        self.config.reset = true;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.config.actions.push(action);
        self
    }

    /// Broadcast choice action.
    pub fn output(self, port: impl Into<String>, value: ValueExpr) -> Self {
        self.action(Action::send(port, value))
    }

    /// Single-channel choice action.
    pub fn output_to(self, port: impl Into<String>, channel: usize, value: ValueExpr) -> Self {
        self.action(Action::send_to(port, channel, value))
    }

    /// Commit action assigning a variable.
    pub fn set(self, name: impl Into<String>, value: ValueExpr) -> Self {
        self.action(Action::set(name, value))
    }

    /// Build the transition declaration.
    pub fn build(self) -> Result<TransitionDecl, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(TransitionDecl {
            from,
            to,
            config: self.config,
        })
    }
}
