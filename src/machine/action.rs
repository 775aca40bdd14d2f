//! Actions bound to transitions.
//!
//! An action is one side-effecting operation with a capability mask saying
//! when it runs: during the evaluate phase (choice), at commit (commit), or
//! both. The controller dispatches every kind through a single match.

use crate::core::Value;
use crate::effects::{EvaluationError, Evaluator, Scope};
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

/// Two-bit mask of the phases an action runs in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0b00);
    pub const CHOICE: Self = Self(0b01);
    pub const COMMIT: Self = Self(0b10);
    pub const BOTH: Self = Self(0b11);

    pub fn is_choice(self) -> bool {
        self.0 & Self::CHOICE.0 != 0
    }

    pub fn is_commit(self) -> bool {
        self.0 & Self::COMMIT.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True iff every bit of `self` is also set in `other`.
    pub fn is_subset_of(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_choice(), self.is_commit()) {
            (true, true) => f.write_str("choice+commit"),
            (true, false) => f.write_str("choice"),
            (false, true) => f.write_str("commit"),
            (false, false) => f.write_str("none"),
        }
    }
}

/// Compiled right-hand side of an action.
pub type ValueFn = Arc<dyn Fn(&Scope) -> Result<Value, EvaluationError> + Send + Sync>;

/// Right-hand side of an action.
#[derive(Clone)]
pub enum ValueExpr {
    Literal(Value),
    /// Identifier resolved in the action scope.
    Variable(String),
    /// Expression string handed to the configured [`Evaluator`].
    Expression(String),
    Computed(ValueFn),
}

impl ValueExpr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn expression(expression: impl Into<String>) -> Self {
        Self::Expression(expression.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Scope) -> Result<Value, EvaluationError> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    pub fn evaluate(
        &self,
        evaluator: &dyn Evaluator,
        scope: &Scope,
    ) -> Result<Value, EvaluationError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Variable(name) => scope.lookup(name),
            Self::Expression(expression) => evaluator.evaluate_value(expression, scope),
            Self::Computed(f) => f(scope),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Literal(value) => value.to_string(),
            Self::Variable(name) => name.clone(),
            Self::Expression(expression) => expression.clone(),
            Self::Computed(_) => "<computed>".to_string(),
        }
    }
}

impl From<Value> for ValueExpr {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Debug for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueExpr").field(&self.describe()).finish()
    }
}

/// What an action does.
#[derive(Clone, Debug)]
pub enum ActionKind {
    /// Send a value to an output port; `channel: None` broadcasts to every
    /// channel of the port.
    SendOutput {
        port: String,
        channel: Option<usize>,
        value: ValueExpr,
    },
    /// Assign a declared machine variable.
    SetVariable { name: String, value: ValueExpr },
    /// Reinitialize the destination state's refinement.
    ResetRefinement,
}

impl ActionKind {
    /// Capabilities this kind of action may carry.
    ///
    /// Choice actions may run several times per firing, so only output
    /// writes, which overwrite, are allowed there.
    pub fn allowed_capabilities(&self) -> Capabilities {
        match self {
            Self::SendOutput { .. } => Capabilities::BOTH,
            Self::SetVariable { .. } | Self::ResetRefinement => Capabilities::COMMIT,
        }
    }
}

/// An action and the phases it runs in.
///
/// # Example
///
/// ```rust
/// use modal_fsm::machine::{Action, Capabilities, ValueExpr};
///
/// let output = Action::send("y", ValueExpr::literal(1.0));
/// assert!(output.is_choice());
/// assert!(!output.is_commit());
///
/// let both = output.with_capabilities(Capabilities::BOTH);
/// assert!(both.is_commit());
///
/// let assign = Action::set("count", ValueExpr::expression("count + 1"));
/// assert_eq!(assign.capabilities(), Capabilities::COMMIT);
/// ```
#[derive(Clone, Debug)]
pub struct Action {
    kind: ActionKind,
    capabilities: Capabilities,
}

impl Action {
    pub fn new(kind: ActionKind, capabilities: Capabilities) -> Self {
        Self { kind, capabilities }
    }

    /// Broadcast to every channel of `port`, as a choice action.
    pub fn send(port: impl Into<String>, value: ValueExpr) -> Self {
        Self::new(
            ActionKind::SendOutput {
                port: port.into(),
                channel: None,
                value,
            },
            Capabilities::CHOICE,
        )
    }

    /// Write one channel of `port`, as a choice action.
    pub fn send_to(port: impl Into<String>, channel: usize, value: ValueExpr) -> Self {
        Self::new(
            ActionKind::SendOutput {
                port: port.into(),
                channel: Some(channel),
                value,
            },
            Capabilities::CHOICE,
        )
    }

    /// Assign a variable, as a commit action.
    pub fn set(name: impl Into<String>, value: ValueExpr) -> Self {
        Self::new(
            ActionKind::SetVariable {
                name: name.into(),
                value,
            },
            Capabilities::COMMIT,
        )
    }

    /// Reinitialize the destination refinement, as a commit action.
    pub fn reset_refinement() -> Self {
        Self::new(ActionKind::ResetRefinement, Capabilities::COMMIT)
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_choice(&self) -> bool {
        self.capabilities.is_choice()
    }

    pub fn is_commit(&self) -> bool {
        self.capabilities.is_commit()
    }

    /// Why this action cannot be attached to a transition, if it cannot.
    pub fn capability_violation(&self) -> Option<String> {
        if self.capabilities.is_empty() {
            return Some(format!("action '{}' has no capability", self.describe()));
        }
        let allowed = self.kind.allowed_capabilities();
        if !self.capabilities.is_subset_of(allowed) {
            return Some(format!(
                "action '{}' may only be {allowed}, not {}",
                self.describe(),
                self.capabilities
            ));
        }
        None
    }

    pub fn describe(&self) -> String {
        match &self.kind {
            ActionKind::SendOutput {
                port,
                channel: Some(channel),
                value,
            } => format!("{port}({channel}) = {}", value.describe()),
            ActionKind::SendOutput {
                port,
                channel: None,
                value,
            } => format!("{port} = {}", value.describe()),
            ActionKind::SetVariable { name, value } => format!("{name} := {}", value.describe()),
            ActionKind::ResetRefinement => "reset refinement".to_string(),
        }
    }
}
