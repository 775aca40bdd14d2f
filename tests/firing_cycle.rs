//! Firing-cycle scenarios driven through the public API.

use modal_fsm::builder::{MachineBuilder, TransitionBuilder};
use modal_fsm::controller::{
    first_alternative, FiringConfig, FiringFault, FsmController, Phase, StateChange, StepResult,
};
use modal_fsm::core::{RelationType, Value};
use modal_fsm::effects::{Dataflow, EvaluationError, Evaluator, PortMap, Scope};
use modal_fsm::machine::{
    Action, Comparison, GuardContext, Machine, Refinement, RefinementError, TransitionId,
    ValueExpr,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Evaluator for `lhs op rhs`, `true`, `false`, `fail` guards and
/// `operand [+ operand]` values.
struct TinyEvaluator;

const OPERATORS: [(&str, Comparison); 6] = [
    (">=", Comparison::GreaterOrEqual),
    ("<=", Comparison::LessOrEqual),
    ("==", Comparison::Equal),
    ("!=", Comparison::NotEqual),
    (">", Comparison::Greater),
    ("<", Comparison::Less),
];

fn operand(scope: &Scope, text: &str) -> Result<f64, EvaluationError> {
    let text = text.trim();
    match text.parse::<f64>() {
        Ok(number) => Ok(number),
        Err(_) => scope.number(text),
    }
}

impl Evaluator for TinyEvaluator {
    fn evaluate_guard(
        &self,
        expression: &str,
        context: &mut GuardContext<'_>,
    ) -> Result<bool, EvaluationError> {
        match expression.trim() {
            "true" => return Ok(context.boolean(true)),
            "false" => return Ok(context.boolean(false)),
            "fail" => return Err(EvaluationError::Model("assertion failed".to_string())),
            _ => {}
        }
        for (symbol, op) in OPERATORS {
            if let Some((lhs, rhs)) = expression.split_once(symbol) {
                let lhs = operand(context.scope(), lhs)?;
                let rhs = operand(context.scope(), rhs)?;
                return Ok(context.compare(lhs, op, rhs));
            }
        }
        Err(EvaluationError::Parse(format!("cannot parse '{expression}'")))
    }

    fn evaluate_value(&self, expression: &str, scope: &Scope) -> Result<Value, EvaluationError> {
        let total = expression
            .split('+')
            .map(|term| operand(scope, term))
            .sum::<Result<f64, _>>()?;
        Ok(Value::Double(total))
    }
}

struct CountingRefinement(Rc<Cell<u32>>);

impl Refinement for CountingRefinement {
    fn initialize(&mut self) -> Result<(), RefinementError> {
        self.0.set(self.0.get() + 1);
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn controller(machine: Machine) -> FsmController<TinyEvaluator> {
    init_tracing();
    let mut controller = FsmController::with_evaluator(machine, TinyEvaluator);
    controller.initialize().unwrap();
    controller
}

fn transition(controller: &FsmController<TinyEvaluator>, name: &str) -> TransitionId {
    controller.machine().transition_by_name(name).unwrap()
}

fn inputs(x: f64) -> PortMap {
    let mut ports = PortMap::new();
    ports.set_input("x", 0, x);
    ports
}

/// States A and B; preemptive A->B on `x > 0`, non-preemptive self-loop on A.
fn preemption_machine() -> Machine {
    MachineBuilder::new("preemption")
        .input("x", 1)
        .output("y", 1)
        .state("A")
        .state("B")
        .initial("A")
        .transition(
            TransitionBuilder::new()
                .from("A")
                .to("B")
                .name("escape")
                .preemptive()
                .expression("x > 0")
                .output("y", ValueExpr::literal(1i64)),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("A")
                .to("A")
                .name("stay")
                .expression("true")
                .output("y", ValueExpr::literal(0i64)),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn initialize_enters_initial_state_with_no_relation_history() {
    let mut controller = controller(preemption_machine());
    let mut ports = inputs(-1.0);
    controller.step(&mut ports).unwrap();
    controller.initialize().unwrap();

    assert_eq!(controller.current_state_name(), Some("A"));
    assert_eq!(controller.cycle(), 0);
    assert!(controller.history().is_empty());
    for t in controller.machine().transitions() {
        for node in t.relation_list().iter() {
            assert_eq!(node.previous_type(), RelationType::Invalid);
        }
    }
}

#[test]
fn preemptive_transition_wins_over_enabled_self_loop() {
    let mut controller = controller(preemption_machine());
    let escape = transition(&controller, "escape");
    let mut ports = inputs(5.0);

    let result = controller.step(&mut ports).unwrap();

    assert!(matches!(result, StepResult::Transitioned { transition, .. } if transition == escape));
    assert_eq!(controller.current_state_name(), Some("B"));
    assert_eq!(ports.output("y", 0), Some(&Value::Int(1)));
}

#[test]
fn preemption_skips_evaluating_the_other_tier() {
    let mut controller = controller(preemption_machine());
    let stay = transition(&controller, "stay");
    let mut ports = inputs(5.0);

    controller.fire(&mut ports).unwrap();

    assert!(controller
        .machine()
        .transition(stay)
        .unwrap()
        .relation_list()
        .is_empty());
}

#[test]
fn self_loop_fires_when_preemptive_guard_is_false() {
    let mut controller = controller(preemption_machine());
    let stay = transition(&controller, "stay");
    let mut ports = inputs(-5.0);

    assert_eq!(controller.fire(&mut ports).unwrap(), Some(stay));
    assert_eq!(ports.output("y", 0), Some(&Value::Int(0)));
    assert_eq!(controller.postfire(&mut ports).unwrap(), Some(stay));
    assert_eq!(controller.current_state_name(), Some("A"));
    assert_eq!(controller.history().path(), vec!["A", "A"]);
}

#[test]
fn zero_enabled_keeps_state_and_skips_commit_actions() {
    let machine = MachineBuilder::new("idle")
        .input("x", 1)
        .parameter("count", 0i64)
        .state("A")
        .state("B")
        .initial("A")
        .transition(
            TransitionBuilder::new()
                .from("A")
                .to("B")
                .expression("x > 10")
                .set("count", ValueExpr::literal(1i64)),
        )
        .unwrap()
        .build()
        .unwrap();
    let mut controller = controller(machine);
    let mut ports = inputs(3.0);

    let result = controller.step(&mut ports).unwrap();

    assert!(matches!(result, StepResult::Stayed { .. }));
    assert_eq!(controller.current_state_name(), Some("A"));
    assert_eq!(controller.variable("count"), Some(&Value::Int(0)));
    assert_eq!(controller.cycle(), 1);
    assert!(controller.history().is_empty());
}

#[test]
fn commit_actions_run_once_in_declared_order() {
    let machine = MachineBuilder::new("ordered")
        .input("x", 1)
        .output("trace", 1)
        .parameter("a", 0.0)
        .parameter("b", 0.0)
        .state("A")
        .state("B")
        .initial("A")
        .transition(
            TransitionBuilder::new()
                .from("A")
                .to("B")
                .expression("x > 0")
                .set("a", ValueExpr::expression("a + 1"))
                .set("b", ValueExpr::expression("a + 10"))
                .action(
                    Action::send("trace", ValueExpr::variable("b"))
                        .with_capabilities(modal_fsm::machine::Capabilities::COMMIT),
                ),
        )
        .unwrap()
        .build()
        .unwrap();
    let mut controller = controller(machine);
    let mut ports = inputs(1.0);

    // Several evaluate passes before a single commit.
    controller.fire(&mut ports).unwrap();
    controller.fire(&mut ports).unwrap();
    controller.fire(&mut ports).unwrap();
    assert_eq!(ports.write_count(), 0);
    controller.postfire(&mut ports).unwrap();

    assert_eq!(controller.variable("a"), Some(&Value::Double(1.0)));
    assert_eq!(controller.variable("b"), Some(&Value::Double(11.0)));
    assert_eq!(ports.output("trace", 0), Some(&Value::Double(11.0)));
    assert_eq!(ports.write_count(), 1);
    assert_eq!(controller.current_state_name(), Some("B"));
}

#[test]
fn multiple_enabled_transitions_fail_the_cycle() {
    let machine = MachineBuilder::new("ambiguous")
        .input("x", 1)
        .state("A")
        .state("B")
        .state("C")
        .initial("A")
        .transition(TransitionBuilder::new().from("A").to("B").expression("x > 0"))
        .unwrap()
        .transition(TransitionBuilder::new().from("A").to("C").expression("x > 1"))
        .unwrap()
        .build()
        .unwrap();
    let mut controller = controller(machine);
    let mut ports = inputs(5.0);

    let fault = controller.step(&mut ports).unwrap_err();

    match fault {
        FiringFault::MultipleEnabledTransitions { state, transitions } => {
            assert_eq!(state, "A");
            assert_eq!(transitions, vec!["A->B", "A->C"]);
        }
        other => panic!("expected multiple enabled transitions, got {other:?}"),
    }
    assert_eq!(controller.current_state_name(), Some("A"));
    assert_eq!(controller.phase(), Phase::Idle);
}

#[test]
fn recovery_handler_resolves_multiple_enabled() {
    let machine = MachineBuilder::new("ambiguous")
        .input("x", 1)
        .state("A")
        .state("B")
        .state("C")
        .initial("A")
        .transition(TransitionBuilder::new().from("A").to("B").expression("x > 0"))
        .unwrap()
        .transition(TransitionBuilder::new().from("A").to("C").expression("x > 1"))
        .unwrap()
        .build()
        .unwrap();
    let mut controller = controller(machine).with_recovery(
        |_: &FiringFault, alternatives: &[TransitionId], _: &Machine| alternatives.last().copied(),
    );
    let mut ports = inputs(5.0);

    controller.step(&mut ports).unwrap();

    assert_eq!(controller.current_state_name(), Some("C"));
}

#[test]
fn conflicting_transitions_are_the_offered_alternatives() {
    let machine = MachineBuilder::new("ambiguous")
        .input("x", 1)
        .state("A")
        .state("B")
        .state("C")
        .initial("A")
        .transition(TransitionBuilder::new().from("A").to("B").expression("x > 0"))
        .unwrap()
        .transition(TransitionBuilder::new().from("A").to("C").expression("x > 1"))
        .unwrap()
        .build()
        .unwrap();
    let offered = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&offered);
    let mut controller = controller(machine).with_recovery(
        move |_: &FiringFault, alternatives: &[TransitionId], machine: &Machine| {
            seen.borrow_mut().extend(
                alternatives
                    .iter()
                    .map(|id| machine.transition(*id).unwrap().name().to_string()),
            );
            None
        },
    );
    let mut ports = inputs(5.0);

    assert!(matches!(
        controller.step(&mut ports),
        Err(FiringFault::MultipleEnabledTransitions { .. })
    ));
    assert_eq!(*offered.borrow(), vec!["A->B".to_string(), "A->C".to_string()]);
}

fn model_error_machine() -> Machine {
    MachineBuilder::new("asserting")
        .input("x", 1)
        .state("A")
        .state("Checked")
        .state("Fallback")
        .initial("A")
        .transition(
            TransitionBuilder::new()
                .from("A")
                .to("Checked")
                .name("check")
                .expression("fail"),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("A")
                .to("Fallback")
                .name("fallback")
                .expression("x >= 0"),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn model_error_propagates_without_handler() {
    let mut controller = controller(model_error_machine());
    let mut ports = inputs(1.0);

    let fault = controller.step(&mut ports).unwrap_err();

    assert!(fault.is_model_error());
    assert_eq!(controller.current_state_name(), Some("A"));
}

#[test]
fn model_error_recovers_through_other_enabled_transition() {
    let offered = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&offered);
    let mut controller = controller(model_error_machine()).with_recovery(
        move |fault: &FiringFault, alternatives: &[TransitionId], machine: &Machine| {
            assert!(fault.is_model_error());
            seen.borrow_mut().extend(
                alternatives
                    .iter()
                    .map(|id| machine.transition(*id).unwrap().name().to_string()),
            );
            alternatives.first().copied()
        },
    );
    let mut ports = inputs(1.0);

    controller.step(&mut ports).unwrap();

    assert_eq!(controller.current_state_name(), Some("Fallback"));
    assert_eq!(*offered.borrow(), vec!["fallback".to_string()]);
}

#[test]
fn model_error_without_alternative_propagates() {
    let mut controller = controller(model_error_machine()).with_recovery(first_alternative());
    let mut ports = inputs(-1.0);

    assert!(controller.step(&mut ports).unwrap_err().is_model_error());
    assert_eq!(controller.current_state_name(), Some("A"));
}

#[test]
fn handler_choosing_outside_alternatives_is_ignored() {
    let mut other = Machine::new("other");
    let s = other.add_state("S").unwrap();
    let foreign = other
        .add_transition(s, s, Default::default())
        .unwrap();

    let mut controller = controller(model_error_machine()).with_recovery(
        move |_: &FiringFault, _: &[TransitionId], _: &Machine| Some(foreign),
    );
    let mut ports = inputs(1.0);

    assert!(controller.step(&mut ports).is_err());
    assert_eq!(controller.current_state_name(), Some("A"));
}

#[test]
fn choice_actions_are_idempotent_within_a_pass() {
    let mut controller = controller(preemption_machine());
    let escape = transition(&controller, "escape");
    let mut once = inputs(5.0);
    let mut twice = inputs(5.0);

    controller.execute_choice_actions(escape, &mut once).unwrap();
    controller.execute_choice_actions(escape, &mut twice).unwrap();
    controller.execute_choice_actions(escape, &mut twice).unwrap();

    assert_eq!(once.outputs(), twice.outputs());
    assert_eq!(twice.write_count(), 2);
}

/// A->B broadcasts `y = 1` as a choice action and resets B, which has no
/// refinement, so every commit fails.
fn unresettable_machine() -> Machine {
    MachineBuilder::new("unresettable")
        .input("x", 1)
        .output("y", 2)
        .state("A")
        .state("B")
        .initial("A")
        .transition(
            TransitionBuilder::new()
                .from("A")
                .to("B")
                .expression("x > 0")
                .output("y", ValueExpr::literal(1i64))
                .action(Action::reset_refinement()),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn failed_commit_retracts_choice_outputs() {
    let mut controller = controller(unresettable_machine());
    let mut ports = inputs(1.0);
    ports.write_output("y", 0, Value::Int(7));

    controller.fire(&mut ports).unwrap();
    assert_eq!(ports.output("y", 1), Some(&Value::Int(1)));
    let fault = controller.postfire(&mut ports).unwrap_err();

    assert!(matches!(fault, FiringFault::MissingRefinement { ref state } if state == "B"));
    assert_eq!(controller.current_state_name(), Some("A"));
    assert_eq!(ports.output("y", 0), Some(&Value::Int(7)));
    assert_eq!(ports.output("y", 1), None);
}

#[test]
fn exceeding_the_pass_limit_retracts_choice_outputs() {
    let mut controller = FsmController::with_evaluator(preemption_machine(), TinyEvaluator)
        .with_config(FiringConfig::new().max_evaluate_passes(1));
    controller.initialize().unwrap();
    let mut ports = inputs(5.0);

    controller.fire(&mut ports).unwrap();
    assert_eq!(ports.output("y", 0), Some(&Value::Int(1)));

    assert!(matches!(
        controller.fire(&mut ports),
        Err(FiringFault::PassLimitExceeded { limit: 1 })
    ));
    assert_eq!(ports.output("y", 0), None);
    assert_eq!(controller.phase(), Phase::Idle);
}

#[test]
fn failing_later_pass_retracts_earlier_pass_outputs() {
    let mut controller = controller(preemption_machine());
    let mut ports = inputs(5.0);
    ports.write_output("y", 0, Value::Int(3));

    controller.fire(&mut ports).unwrap();
    assert_eq!(ports.output("y", 0), Some(&Value::Int(1)));

    // The guard can no longer read `x`.
    ports.clear_input("x", 0);
    assert!(controller.fire(&mut ports).is_err());

    assert_eq!(ports.output("y", 0), Some(&Value::Int(3)));
    assert_eq!(controller.current_state_name(), Some("A"));
}

#[test]
fn committed_cycles_keep_their_outputs() {
    let mut controller = controller(preemption_machine());
    let mut ports = inputs(-1.0);
    controller.step(&mut ports).unwrap();

    ports.set_input("x", 0, 1.0);
    controller.step(&mut ports).unwrap();

    assert_eq!(controller.current_state_name(), Some("B"));
    assert_eq!(ports.output("y", 0), Some(&Value::Int(1)));
}

#[test]
fn failed_commit_leaves_everything_unchanged() {
    let machine = MachineBuilder::new("atomic")
        .input("x", 1)
        .output("y", 1)
        .parameter("count", 0.0)
        .state("A")
        .state("B")
        .initial("A")
        .transition(
            TransitionBuilder::new()
                .from("A")
                .to("B")
                .expression("x > 0")
                .set("count", ValueExpr::literal(1.0))
                .action(
                    Action::send("y", ValueExpr::literal(true))
                        .with_capabilities(modal_fsm::machine::Capabilities::COMMIT),
                )
                .set("count", ValueExpr::expression("missing")),
        )
        .unwrap()
        .build()
        .unwrap();
    let mut controller = controller(machine);
    let t = transition(&controller, "A->B");

    let mut ports = inputs(-1.0);
    controller.step(&mut ports).unwrap();
    let before = controller
        .machine()
        .transition(t)
        .unwrap()
        .relation_list()
        .clone();

    ports.set_input("x", 0, 1.0);
    let fault = controller.step(&mut ports).unwrap_err();

    assert!(matches!(fault, FiringFault::UnresolvedReference { ref name } if name == "missing"));
    assert_eq!(controller.current_state_name(), Some("A"));
    assert_eq!(controller.variable("count"), Some(&Value::Double(0.0)));
    assert_eq!(ports.output("y", 0), None);
    assert_eq!(controller.machine().transition(t).unwrap().relation_list(), &before);
    assert_eq!(controller.cycle(), 1);
}

#[test]
fn all_relation_lists_commit_together() {
    let machine = MachineBuilder::new("levels")
        .input("x", 1)
        .state("A")
        .state("B")
        .initial("A")
        .transition(TransitionBuilder::new().from("A").to("B").name("up").expression("x > 10"))
        .unwrap()
        .transition(TransitionBuilder::new().from("A").to("A").name("low").expression("x < 5"))
        .unwrap()
        .build()
        .unwrap();
    let mut controller = controller(machine);
    let up = transition(&controller, "up");
    let low = transition(&controller, "low");

    // x = 7: nothing enabled, the cycle is still committed.
    let mut ports = inputs(7.0);
    controller.step(&mut ports).unwrap();

    for id in [up, low] {
        let node = controller
            .machine()
            .transition(id)
            .unwrap()
            .relation_list()
            .get(0)
            .cloned()
            .unwrap();
        assert_eq!(node.previous_type(), node.current_type());
    }

    // Crossing 10 upward is an event on `up` once evaluated.
    ports.set_input("x", 0, 12.0);
    controller.fire(&mut ports).unwrap();
    let relations = controller.machine().transition(up).unwrap().relation_list();
    assert!(relations.has_event());
}

#[test]
fn listener_sees_each_committed_change() {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let mut controller = controller(preemption_machine())
        .with_listener(move |change: &StateChange| sink.borrow_mut().push(change.clone()));

    let mut ports = inputs(-1.0);
    controller.step(&mut ports).unwrap();
    ports.set_input("x", 0, 1.0);
    controller.step(&mut ports).unwrap();

    let changes = changes.borrow();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].transition_name, "stay");
    assert_eq!(changes[1].from_name, "A");
    assert_eq!(changes[1].to_name, "B");
    assert_eq!(changes[1].cycle, 1);
}

#[test]
fn reset_initializes_destination_refinement() {
    let inits = Rc::new(Cell::new(0));
    let machine = MachineBuilder::new("refined")
        .input("x", 1)
        .state("A")
        .refined_state("B", CountingRefinement(Rc::clone(&inits)))
        .initial("A")
        .transition(TransitionBuilder::new().from("A").to("B").reset().expression("x > 0"))
        .unwrap()
        .transition(TransitionBuilder::new().from("B").to("A").expression("x < 0"))
        .unwrap()
        .build()
        .unwrap();
    let mut controller = controller(machine);

    let mut ports = inputs(1.0);
    controller.step(&mut ports).unwrap();
    assert_eq!(inits.get(), 1);

    ports.set_input("x", 0, -1.0);
    controller.step(&mut ports).unwrap();
    assert_eq!(inits.get(), 1);
}

#[test]
fn reset_action_without_refinement_is_a_missing_refinement() {
    let machine = MachineBuilder::new("bare")
        .input("x", 1)
        .state("A")
        .state("B")
        .initial("A")
        .transition(
            TransitionBuilder::new()
                .from("A")
                .to("B")
                .expression("x > 0")
                .action(Action::reset_refinement()),
        )
        .unwrap()
        .build()
        .unwrap();
    let mut controller = controller(machine);
    let mut ports = inputs(1.0);

    assert!(matches!(
        controller.step(&mut ports),
        Err(FiringFault::MissingRefinement { ref state }) if state == "B"
    ));
    assert_eq!(controller.current_state_name(), Some("A"));
}

#[test]
fn clearing_relations_on_transition_drops_former_state_history() {
    let mut controller = FsmController::with_evaluator(preemption_machine(), TinyEvaluator)
        .with_config(FiringConfig::new().clear_relations_on_transition(true));
    controller.initialize().unwrap();
    let escape = transition(&controller, "escape");

    let mut ports = inputs(5.0);
    controller.step(&mut ports).unwrap();

    let node = controller
        .machine()
        .transition(escape)
        .unwrap()
        .relation_list()
        .get(0)
        .cloned()
        .unwrap();
    assert_eq!(node.previous_type(), RelationType::Invalid);
}

fn crossing_machine() -> Machine {
    MachineBuilder::new("crossing")
        .input("x", 1)
        .state("Below")
        .state("Above")
        .initial("Below")
        .transition(
            TransitionBuilder::new()
                .from("Below")
                .to("Above")
                .expression("x > 1"),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn overshooting_a_threshold_asks_for_a_smaller_step() {
    let mut controller = controller(crossing_machine());
    let mut ports = inputs(0.5);
    controller.step(&mut ports).unwrap();

    ports.set_input("x", 0, 3.0);
    controller.fire(&mut ports).unwrap();
    let estimate = controller.estimate_boundary(1e-3).unwrap();

    assert!(!estimate.accurate);
    assert_eq!(estimate.distance, 2.0);
    assert_eq!(estimate.last_distance, 0.5);
    assert!(!controller.has_current_event());

    let refined = controller.refined_step_size(1.0, 1e-3);
    assert!((refined - 0.5005 / 2.5).abs() < 1e-12);
}

#[test]
fn landing_on_a_threshold_is_an_accurate_event() {
    let mut controller = controller(crossing_machine());
    let mut ports = inputs(0.5);
    controller.step(&mut ports).unwrap();

    // Within the relation tolerance of the threshold.
    ports.set_input("x", 0, 1.00001);
    assert_eq!(controller.fire(&mut ports).unwrap(), None);
    let estimate = controller.estimate_boundary(1e-3).unwrap();

    assert!(estimate.accurate);
    assert!(controller.has_current_event());
    assert_eq!(controller.refined_step_size(1.0, 1e-3), 1.0);
}

#[test]
fn estimate_requires_an_evaluate_pass() {
    let mut controller = controller(crossing_machine());
    assert!(matches!(
        controller.estimate_boundary(1e-3),
        Err(FiringFault::ProtocolViolation { .. })
    ));
}

#[test]
fn checkpoint_restores_into_a_fresh_controller() {
    let mut original = controller(preemption_machine());
    let mut ports = inputs(-1.0);
    original.step(&mut ports).unwrap();
    ports.set_input("x", 0, 2.0);
    original.step(&mut ports).unwrap();

    let json = original.checkpoint().to_json().unwrap();
    let checkpoint = modal_fsm::checkpoint::Checkpoint::from_json(&json).unwrap();

    let mut resumed = controller(preemption_machine());
    resumed.restore(&checkpoint).unwrap();

    assert_eq!(resumed.current_state_name(), Some("B"));
    assert_eq!(resumed.cycle(), 2);
    assert_eq!(resumed.history().path(), vec!["A", "A", "B"]);
    let escape = transition(&resumed, "escape");
    let node = resumed
        .machine()
        .transition(escape)
        .unwrap()
        .relation_list()
        .get(0)
        .cloned()
        .unwrap();
    assert_eq!(node.previous_type(), RelationType::GreaterThan);
}

#[test]
fn checkpoint_of_another_machine_is_rejected() {
    let source = controller(crossing_machine());
    let mut target = controller(preemption_machine());

    assert!(matches!(
        target.restore(&source.checkpoint()),
        Err(modal_fsm::checkpoint::CheckpointError::ValidationFailed(_))
    ));
    assert_eq!(target.current_state_name(), Some("A"));
}
