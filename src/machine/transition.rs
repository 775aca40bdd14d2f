//! Guarded edges between states.

use crate::core::RelationList;
use crate::effects::{EvaluationError, Evaluator, Scope};
use crate::machine::action::Action;
use crate::machine::guard::{Guard, GuardContext};
use crate::machine::ids::{StateId, TransitionId};

/// Everything about a transition except its endpoints.
///
/// # Example
///
/// ```rust
/// use modal_fsm::machine::{Action, Guard, TransitionConfig, ValueExpr};
///
/// let config = TransitionConfig {
///     name: Some("overheat".to_string()),
///     guard: Guard::expression("temperature > 80"),
///     preemptive: true,
///     actions: vec![Action::send("alarm", ValueExpr::literal(true))],
///     ..TransitionConfig::default()
/// };
/// assert!(!config.reset);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TransitionConfig {
    /// Unique name; defaults to `source->destination`.
    pub name: Option<String>,
    pub guard: Guard,
    /// Checked before, and suppresses, the non-preemptive transitions of the
    /// same source state.
    pub preemptive: bool,
    /// Reinitialize the destination's refinement on entry.
    pub reset: bool,
    /// Choice and commit actions, in execution order.
    pub actions: Vec<Action>,
}

/// A guarded edge owned by its source state.
#[derive(Debug)]
pub struct Transition {
    id: TransitionId,
    name: String,
    source: StateId,
    destination: StateId,
    guard: Guard,
    preemptive: bool,
    reset: bool,
    actions: Vec<Action>,
    relations: RelationList,
}

impl Transition {
    pub(crate) fn new(
        id: TransitionId,
        name: String,
        source: StateId,
        destination: StateId,
        config: TransitionConfig,
    ) -> Self {
        Self {
            id,
            name,
            source,
            destination,
            guard: config.guard,
            preemptive: config.preemptive,
            reset: config.reset,
            actions: config.actions,
            relations: RelationList::new(),
        }
    }

    /// Evaluate the guard for this round.
    ///
    /// Relations the guard reports are pushed into this transition's
    /// relation list before the boolean result is returned.
    pub fn is_enabled(
        &mut self,
        evaluator: &dyn Evaluator,
        scope: &Scope,
        tolerance: f64,
    ) -> Result<bool, EvaluationError> {
        let mut context = GuardContext::new(scope, &mut self.relations, tolerance);
        self.guard.evaluate(evaluator, &mut context)
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_state(&self) -> StateId {
        self.source
    }

    pub fn destination_state(&self) -> StateId {
        self.destination
    }

    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    pub fn is_reset(&self) -> bool {
        self.reset
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    /// All actions in declaration order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Actions run during the evaluate phase, in order.
    pub fn choice_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| a.is_choice())
    }

    /// Actions run at commit, in order.
    pub fn commit_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| a.is_commit())
    }

    pub fn relation_list(&self) -> &RelationList {
        &self.relations
    }

    pub fn relation_list_mut(&mut self) -> &mut RelationList {
        &mut self.relations
    }

    /// Replace the guard; its relations are rebuilt on next evaluation.
    pub(crate) fn set_guard(&mut self, guard: Guard) {
        self.guard = guard;
        self.relations.destroy();
    }

    pub(crate) fn replace_relations(&mut self, relations: RelationList) {
        self.relations = relations;
    }
}
