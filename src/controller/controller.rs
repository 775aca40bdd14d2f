//! The firing engine.

use crate::checkpoint::{Checkpoint, CheckpointError, CHECKPOINT_VERSION};
use crate::controller::boundary::{self, BoundaryEstimate, Candidates};
use crate::controller::config::{FiringConfig, GuardFaultPolicy};
use crate::controller::error::{FiringFault, Phase};
use crate::controller::listener::{StateChange, StateListener};
use crate::controller::recovery::RecoveryHandler;
use crate::core::{RelationList, TransitionHistory, TransitionRecord, Value};
use crate::effects::{Dataflow, Evaluator, NoEvaluator, Scope};
use crate::machine::{ActionKind, Machine, Preemption, StateId, TransitionId, ValueExpr};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of a full [`step`](FsmController::step).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// A transition was committed.
    Transitioned {
        transition: TransitionId,
        from: StateId,
        to: StateId,
    },
    /// No transition was enabled.
    Stayed { state: StateId },
}

/// Outcome of evaluating one preemption tier.
#[derive(Default)]
struct TierEvaluation {
    enabled: Vec<TransitionId>,
    /// First guard fault, if any.
    fault: Option<FiringFault>,
    first_event: Option<TransitionId>,
}

type StagedOutput = (String, usize, Value);

/// Drives one [`Machine`] through evaluate/commit firing cycles.
///
/// A cycle is one or more calls to [`fire`](Self::fire) followed by one call
/// to [`postfire`](Self::postfire). `fire` selects at most one enabled
/// transition out of the current state and runs its choice actions; it may
/// be repeated while the surrounding scheduler iterates to a fixed point.
/// `postfire` runs the chosen transition's commit actions, moves to its
/// destination and rolls every relation list into history.
///
/// A fault aborts the cycle: the current state, relation histories,
/// variables and every output channel written during the cycle are left as
/// they were when the cycle began.
///
/// # Example
///
/// ```rust
/// use modal_fsm::controller::FsmController;
/// use modal_fsm::effects::PortMap;
/// use modal_fsm::machine::{Comparison, Guard, Machine, TransitionConfig};
///
/// let mut machine = Machine::new("level");
/// machine.add_input("x", 1).unwrap();
/// let low = machine.add_state("Low").unwrap();
/// let high = machine.add_state("High").unwrap();
/// machine.set_initial(low).unwrap();
/// machine
///     .add_transition(low, high, TransitionConfig {
///         guard: Guard::predicate(|ctx| {
///             let x = ctx.number("x")?;
///             Ok(ctx.compare(x, Comparison::Greater, 10.0))
///         }),
///         ..TransitionConfig::default()
///     })
///     .unwrap();
///
/// let mut controller = FsmController::new(machine);
/// controller.initialize().unwrap();
///
/// let mut ports = PortMap::new();
/// ports.set_input("x", 0, 3.0);
/// controller.step(&mut ports).unwrap();
/// assert_eq!(controller.current_state(), Some(low));
///
/// ports.set_input("x", 0, 12.0);
/// controller.step(&mut ports).unwrap();
/// assert_eq!(controller.current_state(), Some(high));
/// ```
pub struct FsmController<E: Evaluator = NoEvaluator> {
    machine: Machine,
    evaluator: E,
    config: FiringConfig,
    recovery: Option<Box<dyn RecoveryHandler>>,
    listener: Option<Box<dyn StateListener>>,
    current: Option<StateId>,
    phase: Phase,
    chosen: Option<TransitionId>,
    passes: usize,
    /// Relation lists of the current state's transitions when the cycle began.
    snapshot: Vec<(TransitionId, RelationList)>,
    /// Value each output channel held before this cycle first wrote it.
    written: BTreeMap<(String, usize), Option<Value>>,
    candidates: Candidates,
    estimate: Option<BoundaryEstimate>,
    variables: BTreeMap<String, Value>,
    history: TransitionHistory,
    cycle: u64,
    marked: Option<Checkpoint>,
}

impl FsmController<NoEvaluator> {
    /// Controller for machines whose guards and values are all compiled.
    pub fn new(machine: Machine) -> Self {
        Self::with_evaluator(machine, NoEvaluator)
    }
}

impl<E: Evaluator> FsmController<E> {
    pub fn with_evaluator(machine: Machine, evaluator: E) -> Self {
        let config = FiringConfig::default();
        Self {
            machine,
            evaluator,
            history: TransitionHistory::with_limit(config.history_limit),
            config,
            recovery: None,
            listener: None,
            current: None,
            phase: Phase::Idle,
            chosen: None,
            passes: 0,
            snapshot: Vec::new(),
            written: BTreeMap::new(),
            candidates: Candidates::default(),
            estimate: None,
            variables: BTreeMap::new(),
            cycle: 0,
            marked: None,
        }
    }

    pub fn with_config(mut self, config: FiringConfig) -> Self {
        self.history = TransitionHistory::with_limit(config.history_limit);
        self.config = config;
        self
    }

    pub fn with_recovery<H>(mut self, handler: H) -> Self
    where
        H: RecoveryHandler + 'static,
    {
        self.recovery = Some(Box::new(handler));
        self
    }

    pub fn with_listener<L>(mut self, listener: L) -> Self
    where
        L: StateListener + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Exclusive access for structural edits, only between cycles.
    pub fn machine_mut(&mut self) -> Result<&mut Machine, FiringFault> {
        if self.phase != Phase::Idle {
            return Err(FiringFault::ProtocolViolation {
                operation: "machine_mut",
                phase: self.phase,
            });
        }
        Ok(&mut self.machine)
    }

    pub fn into_machine(self) -> Machine {
        self.machine
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn config(&self) -> &FiringConfig {
        &self.config
    }

    pub fn current_state(&self) -> Option<StateId> {
        self.current
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.current
            .and_then(|id| self.machine.state(id))
            .map(|state| state.name())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Transition selected by the latest evaluate pass of this cycle.
    pub fn chosen_transition(&self) -> Option<TransitionId> {
        self.chosen
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    pub fn variables(&self) -> &BTreeMap<String, Value> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Number of committed cycles since initialization.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Enter the initial state with fresh variables and relation histories.
    pub fn initialize(&mut self) -> Result<(), FiringFault> {
        let initial = self.machine.initial_state().ok_or_else(|| {
            FiringFault::structural(format!(
                "machine '{}' has no initial state",
                self.machine.name()
            ))
        })?;

        for transition in self.machine.transitions_mut() {
            transition.relation_list_mut().clear_relation_list();
        }
        self.variables = self.machine.parameters().clone();
        self.history = TransitionHistory::with_limit(self.config.history_limit);
        self.current = Some(initial);
        self.cycle = 0;
        self.estimate = None;
        self.marked = None;
        self.finish_cycle();

        debug!(
            machine = self.machine.name(),
            state = self.current_state_name().unwrap_or_default(),
            "controller initialized"
        );
        Ok(())
    }

    /// Run one evaluate pass and return the chosen transition, if any.
    ///
    /// Preemptive transitions are evaluated first; if exactly one is enabled
    /// it is chosen and the non-preemptive tier is skipped. Two enabled
    /// transitions in the same tier fail with
    /// [`FiringFault::MultipleEnabledTransitions`] unless the recovery
    /// handler picks a substitute.
    pub fn fire(&mut self, io: &mut dyn Dataflow) -> Result<Option<TransitionId>, FiringFault> {
        let state = self.current.ok_or(FiringFault::NotInitialized)?;
        if self.phase == Phase::Committing {
            return Err(FiringFault::ProtocolViolation {
                operation: "fire",
                phase: self.phase,
            });
        }
        if let Some(limit) = self.config.max_evaluate_passes {
            if self.passes >= limit {
                let fault = FiringFault::PassLimitExceeded { limit };
                self.abort_cycle(io, &fault);
                return Err(fault);
            }
        }
        if self.phase == Phase::Idle {
            self.snapshot = self.snapshot_relations(state);
            self.estimate = None;
        }

        match self.evaluate_pass(state, io) {
            Ok(chosen) => {
                self.phase = Phase::Evaluating;
                self.passes += 1;
                self.chosen = chosen;
                Ok(chosen)
            }
            Err(fault) => {
                self.abort_cycle(io, &fault);
                Err(fault)
            }
        }
    }

    /// Commit the cycle and return the transition taken, if any.
    ///
    /// Relation lists of every transition are committed whether or not a
    /// transition was taken, after the commit actions ran.
    pub fn postfire(&mut self, io: &mut dyn Dataflow) -> Result<Option<TransitionId>, FiringFault> {
        if self.current.is_none() {
            return Err(FiringFault::NotInitialized);
        }
        if self.phase != Phase::Evaluating {
            return Err(FiringFault::ProtocolViolation {
                operation: "postfire",
                phase: self.phase,
            });
        }

        self.phase = Phase::Committing;
        let committed = match self.chosen {
            Some(id) => self.commit_transition(id, io).map(|former| Some((id, former))),
            None => Ok(None),
        };

        match committed {
            Ok(taken) => {
                self.commit_relations(taken.map(|(_, former)| former));
                self.cycle += 1;
                self.finish_cycle();
                Ok(taken.map(|(id, _)| id))
            }
            Err(fault) => {
                self.abort_cycle(io, &fault);
                Err(fault)
            }
        }
    }

    /// One evaluate pass followed by commit.
    pub fn step(&mut self, io: &mut dyn Dataflow) -> Result<StepResult, FiringFault> {
        let from = self.current.ok_or(FiringFault::NotInitialized)?;
        self.fire(io)?;
        Ok(match self.postfire(io)? {
            Some(transition) => StepResult::Transitioned {
                transition,
                from,
                to: self.current.unwrap_or(from),
            },
            None => StepResult::Stayed { state: from },
        })
    }

    /// Run the choice actions of `transition` against the current inputs.
    ///
    /// Outputs are written only if every action succeeds. Running them
    /// again in the same pass overwrites the same channels with the same
    /// values.
    pub fn execute_choice_actions(
        &mut self,
        transition: TransitionId,
        io: &mut dyn Dataflow,
    ) -> Result<(), FiringFault> {
        let scope = self.build_scope(io);
        let outputs = self.stage_choice_outputs(transition, &scope)?;
        if self.phase == Phase::Evaluating {
            self.write_outputs(io, outputs);
        } else {
            flush(io, outputs);
        }
        Ok(())
    }

    /// Compare the relations of the last pass against `error_tolerance`.
    pub fn estimate_boundary(
        &mut self,
        error_tolerance: f64,
    ) -> Result<BoundaryEstimate, FiringFault> {
        if self.phase != Phase::Evaluating {
            return Err(FiringFault::ProtocolViolation {
                operation: "estimate_boundary",
                phase: self.phase,
            });
        }
        let estimate = boundary::estimate(&mut self.machine, &self.candidates, error_tolerance);
        self.estimate = Some(estimate);
        Ok(estimate)
    }

    /// Step size suggested by the latest boundary estimate.
    pub fn refined_step_size(&self, current: f64, error_tolerance: f64) -> f64 {
        self.estimate
            .map_or(current, |estimate| estimate.refined_step_size(current, error_tolerance))
    }

    /// Whether the latest boundary estimate found an event at an accurate step.
    pub fn has_current_event(&self) -> bool {
        self.estimate.is_some_and(|estimate| estimate.has_event)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            machine: self.machine.name().to_string(),
            current_state: self.current_state_name().map(str::to_string),
            relations: self
                .machine
                .transitions()
                .map(|t| (t.name().to_string(), t.relation_list().clone()))
                .collect(),
            variables: self.variables.clone(),
            cycle: self.cycle,
            history: self.history.clone(),
        }
    }

    /// Replace the runtime state with a checkpoint of the same machine.
    ///
    /// The checkpoint is validated in full before anything is changed.
    pub fn restore(&mut self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        if self.phase != Phase::Idle {
            return Err(CheckpointError::Busy(self.phase));
        }
        checkpoint.check_version()?;
        if checkpoint.machine != self.machine.name() {
            return Err(CheckpointError::ValidationFailed(format!(
                "checkpoint of machine '{}' cannot restore machine '{}'",
                checkpoint.machine,
                self.machine.name()
            )));
        }

        let current = match &checkpoint.current_state {
            Some(name) => Some(self.machine.state_by_name(name).ok_or_else(|| {
                CheckpointError::ValidationFailed(format!("unknown state '{name}'"))
            })?),
            None => None,
        };
        let relations = checkpoint
            .relations
            .iter()
            .map(|(name, list)| {
                self.machine
                    .transition_by_name(name)
                    .map(|id| (id, list.clone()))
                    .ok_or_else(|| {
                        CheckpointError::ValidationFailed(format!("unknown transition '{name}'"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(name) = checkpoint
            .variables
            .keys()
            .find(|name| !self.machine.parameters().contains_key(name.as_str()))
        {
            return Err(CheckpointError::ValidationFailed(format!(
                "unknown variable '{name}'"
            )));
        }

        for (id, list) in relations {
            if let Some(transition) = self.machine.transition_mut(id) {
                transition.replace_relations(list);
            }
        }
        self.current = current;
        self.variables = checkpoint.variables.clone();
        self.cycle = checkpoint.cycle;
        self.history = checkpoint.history.clone();
        self.estimate = None;
        self.finish_cycle();

        info!(
            machine = self.machine.name(),
            checkpoint = %checkpoint.id,
            state = self.current_state_name().unwrap_or_default(),
            cycle = self.cycle,
            "restored checkpoint"
        );
        Ok(())
    }

    /// Remember the current runtime state for [`go_to_marked_state`](Self::go_to_marked_state).
    pub fn mark_state(&mut self) {
        self.marked = Some(self.checkpoint());
    }

    /// Roll back to the marked state, abandoning any evaluate passes of the
    /// current cycle.
    pub fn go_to_marked_state(&mut self) -> Result<(), CheckpointError> {
        let marked = self.marked.clone().ok_or(CheckpointError::NothingMarked)?;
        if self.phase == Phase::Evaluating {
            self.finish_cycle();
        }
        self.restore(&marked)
    }

    fn evaluate_pass(
        &mut self,
        state: StateId,
        io: &mut dyn Dataflow,
    ) -> Result<Option<TransitionId>, FiringFault> {
        self.machine.state_checked(state)?;
        let scope = self.build_scope(io);
        let chosen = self.select(state, &scope)?;

        if let Some(id) = chosen {
            let outputs = self.stage_choice_outputs(id, &scope)?;
            debug!(
                machine = self.machine.name(),
                transition = self.transition_name(id),
                pass = self.passes + 1,
                outputs = outputs.len(),
                "transition chosen"
            );
            self.write_outputs(io, outputs);
        }
        Ok(chosen)
    }

    fn select(
        &mut self,
        state: StateId,
        scope: &Scope,
    ) -> Result<Option<TransitionId>, FiringFault> {
        let preemptive = self.machine.preemptive_transition_list(state);
        let nonpreemptive = self.machine.nonpreemptive_transition_list(state);
        self.candidates = Candidates::default();

        let first = self.evaluate_tier(&preemptive, scope);
        if let Some(fault) = first.fault {
            let alternatives = self.evaluate_tier(&nonpreemptive, scope).enabled;
            return self.recover(fault, alternatives).map(Some);
        }
        match first.enabled.as_slice() {
            [] => {}
            [only] => return Ok(Some(*only)),
            many => {
                let fault = self.multiple_enabled(state, many);
                let alternatives = self.evaluate_tier(&nonpreemptive, scope).enabled;
                return self.recover(fault, alternatives).map(Some);
            }
        }

        let second = self.evaluate_tier(&nonpreemptive, scope);
        if let Some(fault) = second.fault {
            return self.recover(fault, second.enabled).map(Some);
        }
        match second.enabled.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            many => {
                let fault = self.multiple_enabled(state, many);
                self.recover(fault, many.to_vec()).map(Some)
            }
        }
    }

    /// Evaluate every guard of a tier in declaration order.
    fn evaluate_tier(&mut self, tier: &[TransitionId], scope: &Scope) -> TierEvaluation {
        let mut evaluation = TierEvaluation::default();
        let tolerance = self.config.relation_tolerance;

        for &id in tier {
            let Some(transition) = self.machine.transition_mut(id) else {
                continue;
            };
            let outcome = transition.is_enabled(&self.evaluator, scope, tolerance);
            if evaluation.first_event.is_none() && transition.relation_list().has_event() {
                debug!(transition = transition.name(), "relation crossed its threshold");
                evaluation.first_event = Some(id);
            }

            match outcome {
                Ok(true) => evaluation.enabled.push(id),
                Ok(false) => {}
                Err(error) => {
                    let fault = FiringFault::from_evaluation(transition.name(), error);
                    let downgrade = self.config.guard_fault_policy
                        == GuardFaultPolicy::TreatAsDisabled
                        && matches!(fault, FiringFault::GuardEvaluation { .. })
                        && !fault.is_model_error();
                    if downgrade {
                        debug!(error = %fault, "guard fault treated as disabled");
                    } else if evaluation.fault.is_none() {
                        evaluation.fault = Some(fault);
                    }
                }
            }
        }

        self.candidates.enabled.extend(&evaluation.enabled);
        self.candidates.with_event.extend(evaluation.first_event);
        evaluation
    }

    fn recover(
        &mut self,
        fault: FiringFault,
        alternatives: Vec<TransitionId>,
    ) -> Result<TransitionId, FiringFault> {
        if !fault.is_recoverable() || alternatives.is_empty() {
            return Err(fault);
        }
        let Some(handler) = self.recovery.as_mut() else {
            return Err(fault);
        };
        match handler.recover(&fault, &alternatives, &self.machine) {
            Some(choice) if alternatives.contains(&choice) => {
                warn!(
                    machine = self.machine.name(),
                    error = %fault,
                    substitute = self.transition_name(choice),
                    "recovered from firing fault"
                );
                Ok(choice)
            }
            _ => Err(fault),
        }
    }

    fn multiple_enabled(&self, state: StateId, enabled: &[TransitionId]) -> FiringFault {
        FiringFault::MultipleEnabledTransitions {
            state: self
                .machine
                .state(state)
                .map(|s| s.name().to_string())
                .unwrap_or_default(),
            transitions: enabled
                .iter()
                .map(|id| self.transition_name(*id).to_string())
                .collect(),
        }
    }

    fn stage_choice_outputs(
        &self,
        id: TransitionId,
        scope: &Scope,
    ) -> Result<Vec<StagedOutput>, FiringFault> {
        let transition = self.machine.transition_checked(id)?;
        let mut staged = Vec::new();
        for action in transition.choice_actions() {
            match action.kind() {
                ActionKind::SendOutput {
                    port,
                    channel,
                    value,
                } => {
                    let value = self.evaluate_value(transition.name(), value, scope)?;
                    for channel in self.output_channels(port, *channel)? {
                        staged.push((port.clone(), channel, value.clone()));
                    }
                }
                ActionKind::SetVariable { .. } | ActionKind::ResetRefinement => {
                    return Err(FiringFault::structural(format!(
                        "action '{}' cannot run as a choice action",
                        action.describe()
                    )));
                }
            }
        }
        Ok(staged)
    }

    /// Run the commit actions of `id` and enter its destination, returning
    /// the state that was left.
    fn commit_transition(
        &mut self,
        id: TransitionId,
        io: &mut dyn Dataflow,
    ) -> Result<StateId, FiringFault> {
        let from = self.current.ok_or(FiringFault::NotInitialized)?;
        let mut scope = self.build_scope(io);

        let transition = self.machine.transition_checked(id)?;
        let destination = transition.destination_state();
        let target = self.machine.state_checked(destination)?;
        let from_name = self.machine.state_checked(from)?.name().to_string();

        let mut outputs = Vec::new();
        let mut assignments = Vec::new();
        let mut reset = transition.is_reset() && target.has_refinement();

        for action in transition.commit_actions() {
            match action.kind() {
                ActionKind::SendOutput {
                    port,
                    channel,
                    value,
                } => {
                    let value = self.evaluate_value(transition.name(), value, &scope)?;
                    for channel in self.output_channels(port, *channel)? {
                        outputs.push((port.clone(), channel, value.clone()));
                    }
                }
                ActionKind::SetVariable { name, value } => {
                    if !self.variables.contains_key(name)
                        && !self.machine.parameters().contains_key(name)
                    {
                        return Err(FiringFault::UnresolvedReference { name: name.clone() });
                    }
                    let value = self.evaluate_value(transition.name(), value, &scope)?;
                    scope.set_variable(name.clone(), value.clone());
                    assignments.push((name.clone(), value));
                }
                ActionKind::ResetRefinement => {
                    if !target.has_refinement() {
                        return Err(FiringFault::MissingRefinement {
                            state: target.name().to_string(),
                        });
                    }
                    reset = true;
                }
            }
        }

        let transition_name = transition.name().to_string();
        let to_name = target.name().to_string();

        if reset {
            let state = self.machine.state_checked_mut(destination)?;
            if let Some(refinement) = state.refinement_mut() {
                refinement
                    .initialize()
                    .map_err(|source| FiringFault::Refinement {
                        state: to_name.clone(),
                        source,
                    })?;
            }
        }

        self.write_outputs(io, outputs);
        self.variables.extend(assignments);
        self.current = Some(destination);
        self.history.push(TransitionRecord {
            from: from_name.clone(),
            to: to_name.clone(),
            transition: transition_name.clone(),
            timestamp: Utc::now(),
            cycle: self.cycle,
        });

        info!(
            machine = self.machine.name(),
            from = %from_name,
            to = %to_name,
            transition = %transition_name,
            cycle = self.cycle,
            reset,
            "state changed"
        );

        if let Some(listener) = self.listener.as_mut() {
            listener.state_changed(&StateChange {
                from,
                to: destination,
                from_name,
                to_name,
                transition: id,
                transition_name,
                cycle: self.cycle,
            });
        }
        Ok(from)
    }

    fn commit_relations(&mut self, former: Option<StateId>) {
        for transition in self.machine.transitions_mut() {
            transition.relation_list_mut().commit_relation_values();
        }
        if !self.config.clear_relations_on_transition {
            return;
        }
        if let Some(state) = former {
            for id in self.machine.outgoing_transitions(state, Preemption::Any) {
                if let Some(transition) = self.machine.transition_mut(id) {
                    transition.relation_list_mut().clear_relation_list();
                }
            }
        }
    }

    fn build_scope(&self, io: &mut dyn Dataflow) -> Scope {
        let mut scope = Scope::new();
        for port in self.machine.inputs() {
            let channels = (0..port.width)
                .map(|channel| io.read_input(&port.name, channel))
                .collect();
            scope.set_input(port.name.clone(), channels);
        }
        for (name, value) in &self.variables {
            scope.set_variable(name.clone(), value.clone());
        }
        scope
    }

    fn evaluate_value(
        &self,
        transition: &str,
        value: &ValueExpr,
        scope: &Scope,
    ) -> Result<Value, FiringFault> {
        value
            .evaluate(&self.evaluator, scope)
            .map_err(|error| FiringFault::from_evaluation(transition, error))
    }

    fn output_channels(
        &self,
        port: &str,
        channel: Option<usize>,
    ) -> Result<Vec<usize>, FiringFault> {
        let spec = self
            .machine
            .output(port)
            .ok_or_else(|| FiringFault::UnresolvedReference {
                name: port.to_string(),
            })?;
        match channel {
            None => Ok((0..spec.width).collect()),
            Some(channel) if spec.has_channel(channel) => Ok(vec![channel]),
            Some(channel) => Err(FiringFault::UnresolvedReference {
                name: format!("{port}_{channel}"),
            }),
        }
    }

    fn snapshot_relations(&self, state: StateId) -> Vec<(TransitionId, RelationList)> {
        self.machine
            .outgoing_transitions(state, Preemption::Any)
            .into_iter()
            .filter_map(|id| {
                self.machine
                    .transition(id)
                    .map(|t| (id, t.relation_list().clone()))
            })
            .collect()
    }

    fn transition_name(&self, id: TransitionId) -> &str {
        self.machine
            .transition(id)
            .map(|t| t.name())
            .unwrap_or_default()
    }

    /// Write staged outputs, journaling each channel's prior value.
    fn write_outputs(&mut self, io: &mut dyn Dataflow, outputs: Vec<StagedOutput>) {
        for (port, channel, value) in outputs {
            self.written
                .entry((port.clone(), channel))
                .or_insert_with(|| io.read_output(&port, channel));
            io.write_output(&port, channel, value);
        }
    }

    fn abort_cycle(&mut self, io: &mut dyn Dataflow, fault: &FiringFault) {
        for (id, relations) in std::mem::take(&mut self.snapshot) {
            if let Some(transition) = self.machine.transition_mut(id) {
                transition.replace_relations(relations);
            }
        }
        for ((port, channel), prior) in std::mem::take(&mut self.written) {
            match prior {
                Some(value) => io.write_output(&port, channel, value),
                None => io.clear_output(&port, channel),
            }
        }
        debug!(
            machine = self.machine.name(),
            error = %fault,
            "firing cycle aborted"
        );
        self.finish_cycle();
    }

    fn finish_cycle(&mut self) {
        self.phase = Phase::Idle;
        self.chosen = None;
        self.passes = 0;
        self.snapshot.clear();
        self.written.clear();
    }
}

fn flush(io: &mut dyn Dataflow, outputs: Vec<StagedOutput>) {
    for (port, channel, value) in outputs {
        io.write_output(&port, channel, value);
    }
}

impl<E: Evaluator> std::fmt::Debug for FsmController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsmController")
            .field("machine", &self.machine)
            .field("current", &self.current_state_name())
            .field("phase", &self.phase)
            .field("chosen", &self.chosen)
            .field("cycle", &self.cycle)
            .finish()
    }
}
