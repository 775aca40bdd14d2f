//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::transition::{TransitionBuilder, TransitionDecl};
use crate::core::Value;
use crate::machine::{Machine, PortSpec, Refinement};
use crate::validation::StructureRules;

struct StateDecl {
    name: String,
    refinement: Option<Box<dyn Refinement>>,
}

/// Builder for constructing machines by state name with a fluent API.
///
/// `build` resolves names, wires the arena and then checks the
/// [`StructureRules`], reporting every violation at once.
pub struct MachineBuilder {
    name: String,
    inputs: Vec<PortSpec>,
    outputs: Vec<PortSpec>,
    parameters: Vec<(String, Value)>,
    states: Vec<StateDecl>,
    initial: Option<String>,
    transitions: Vec<TransitionDecl>,
    rules: StructureRules,
}

impl MachineBuilder {
    /// Create a new builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            states: Vec::new(),
            initial: None,
            transitions: Vec::new(),
            rules: StructureRules::standard(),
        }
    }

    pub fn input(mut self, name: impl Into<String>, width: usize) -> Self {
        self.inputs.push(PortSpec::new(name, width));
        self
    }

    pub fn output(mut self, name: impl Into<String>, width: usize) -> Self {
        self.outputs.push(PortSpec::new(name, width));
        self
    }

    /// Declare a variable with its initial value.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.states.push(StateDecl {
            name: name.into(),
            refinement: None,
        });
        self
    }

    /// Declare a state refined by `refinement`.
    pub fn refined_state<R>(mut self, name: impl Into<String>, refinement: R) -> Self
    where
        R: Refinement + 'static,
    {
        self.states.push(StateDecl {
            name: name.into(),
            refinement: Some(Box::new(refinement)),
        });
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition declaration.
    pub fn add_transition(mut self, transition: TransitionDecl) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Replace the structure rules checked by `build`.
    pub fn rules(mut self, rules: StructureRules) -> Self {
        self.rules = rules;
        self
    }

    /// Build the machine.
    pub fn build(self) -> Result<Machine, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        let mut machine = Machine::new(self.name);
        for port in self.inputs {
            machine.add_input(port.name, port.width)?;
        }
        for port in self.outputs {
            machine.add_output(port.name, port.width)?;
        }
        for (name, value) in self.parameters {
            machine.add_parameter(name, value);
        }

        for state in self.states {
            if machine.state_by_name(&state.name).is_some() {
                return Err(BuildError::DuplicateState(state.name));
            }
            let id = machine.add_state(state.name)?;
            if state.refinement.is_some() {
                machine.set_refinement(id, state.refinement)?;
            }
        }

        let initial = machine
            .state_by_name(&initial)
            .ok_or(BuildError::UnknownState(initial))?;
        machine.set_initial(initial)?;

        for transition in self.transitions {
            let from = machine
                .state_by_name(&transition.from)
                .ok_or_else(|| BuildError::UnknownState(transition.from.clone()))?;
            let to = machine
                .state_by_name(&transition.to)
                .ok_or_else(|| BuildError::UnknownState(transition.to.clone()))?;
            machine.add_transition(from, to, transition.config)?;
        }

        let violations = self.rules.violations(&machine);
        if !violations.is_empty() {
            return Err(BuildError::Invalid(violations));
        }
        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Action, Capabilities, RefinementError, ValueExpr};
    use crate::validation::{StructuralViolation, StructureRulesBuilder};

    struct Counter;

    impl Refinement for Counter {
        fn initialize(&mut self) -> Result<(), RefinementError> {
            Ok(())
        }
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = MachineBuilder::new("m").state("A").build();
        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn unknown_states_are_reported_by_name() {
        let result = MachineBuilder::new("m")
            .state("A")
            .initial("A")
            .transition(TransitionBuilder::new().from("A").to("Z"))
            .unwrap()
            .build();
        assert!(matches!(result, Err(BuildError::UnknownState(ref name)) if name == "Z"));
    }

    #[test]
    fn duplicate_states_are_rejected() {
        let result = MachineBuilder::new("m")
            .state("A")
            .state("A")
            .initial("A")
            .build();
        assert!(matches!(result, Err(BuildError::DuplicateState(ref name)) if name == "A"));
    }

    #[test]
    fn capability_errors_surface_as_structural_faults() {
        let action =
            Action::set("k", ValueExpr::literal(1i64)).with_capabilities(Capabilities::CHOICE);
        let result = MachineBuilder::new("m")
            .state("A")
            .initial("A")
            .transition(TransitionBuilder::new().from("A").to("A").action(action))
            .unwrap()
            .build();
        assert!(matches!(result, Err(BuildError::Structural(_))));
    }

    #[test]
    fn rule_violations_are_collected() {
        let result = MachineBuilder::new("m")
            .output("y", 1)
            .state("A")
            .initial("A")
            .transition(
                TransitionBuilder::new()
                    .from("A")
                    .to("A")
                    .output("missing", ValueExpr::literal(1i64))
                    .set("undeclared", ValueExpr::literal(2i64)),
            )
            .unwrap()
            .build();

        match result {
            Err(BuildError::Invalid(violations)) => assert_eq!(violations.len(), 2),
            other => panic!("expected rule violations, got {other:?}"),
        }
    }

    #[test]
    fn custom_rules_replace_the_defaults() {
        let result = MachineBuilder::new("m")
            .state("A")
            .initial("A")
            .rules(
                StructureRulesBuilder::new()
                    .require_pred(|m| m.inputs().len() == 1, "needs one input".to_string())
                    .build(),
            )
            .build();

        match result {
            Err(BuildError::Invalid(violations)) => assert_eq!(
                violations,
                vec![StructuralViolation::CustomCheckFailed {
                    message: "needs one input".to_string()
                }]
            ),
            other => panic!("expected rule violations, got {other:?}"),
        }
    }

    #[test]
    fn fluent_api_builds_machine() {
        let machine = MachineBuilder::new("m")
            .input("x", 1)
            .output("y", 2)
            .parameter("count", 0i64)
            .state("A")
            .refined_state("B", Counter)
            .initial("A")
            .transition(TransitionBuilder::new().from("A").to("B").reset())
            .unwrap()
            .transition(
                TransitionBuilder::new()
                    .from("B")
                    .to("A")
                    .preemptive()
                    .set("count", ValueExpr::literal(1i64)),
            )
            .unwrap()
            .build()
            .unwrap();

        let b = machine.state_by_name("B").unwrap();
        assert!(machine.state(b).unwrap().has_refinement());
        assert_eq!(machine.initial_state(), machine.state_by_name("A"));
        assert_eq!(machine.preemptive_transition_list(b).len(), 1);
        assert_eq!(machine.parameters()["count"], Value::Int(0));
    }
}
