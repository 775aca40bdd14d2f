//! Structural rules checked with `Validation`, accumulating every violation.

use crate::machine::{ActionKind, Machine};
use crate::validation::violations::StructuralViolation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for structural check functions
pub type StructureCheck =
    Box<dyn Fn(&Machine) -> Validation<(), NonEmptyVec<StructuralViolation>> + Send + Sync>;

/// Rules a machine must satisfy before it is driven.
///
/// The standard rules are:
/// - exactly one initial state
/// - every action carries capabilities its kind allows
/// - every output action names a declared port and channel
/// - every assignment names a declared variable
/// - no variable shares its name with an input port
pub struct StructureRules {
    pub(crate) standard: bool,
    pub(crate) required_checks: Vec<StructureCheck>,
}

impl StructureRules {
    /// The standard rules and no custom checks.
    pub fn standard() -> Self {
        Self {
            standard: true,
            required_checks: Vec::new(),
        }
    }

    /// Check every rule, returning all violations.
    pub fn enforce(&self, machine: &Machine) -> Validation<(), NonEmptyVec<StructuralViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<StructuralViolation>>> = Vec::new();

        if self.standard {
            checks.push(check_initial_state(machine));
            checks.extend(action_checks(machine));
            checks.extend(shadowing_checks(machine));
        }

        for check_fn in &self.required_checks {
            checks.push(check_fn(machine));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// [`enforce`](Self::enforce) as a plain list; empty when valid.
    pub fn violations(&self, machine: &Machine) -> Vec<StructuralViolation> {
        match self.enforce(machine) {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }
}

impl Default for StructureRules {
    fn default() -> Self {
        Self::standard()
    }
}

fn check_initial_state(machine: &Machine) -> Validation<(), NonEmptyVec<StructuralViolation>> {
    let initial: Vec<String> = machine
        .states()
        .filter(|s| s.is_initial())
        .map(|s| s.name().to_string())
        .collect();
    match initial.len() {
        1 => Validation::success(()),
        0 => Validation::fail(StructuralViolation::NoInitialState),
        _ => Validation::fail(StructuralViolation::MultipleInitialStates { states: initial }),
    }
}

fn action_checks(machine: &Machine) -> Vec<Validation<(), NonEmptyVec<StructuralViolation>>> {
    let mut checks = Vec::new();
    for transition in machine.transitions() {
        let name = transition.name();
        for action in transition.actions() {
            if let Some(reason) = action.capability_violation() {
                checks.push(Validation::fail(StructuralViolation::ActionCapability {
                    transition: name.to_string(),
                    reason,
                }));
            }
            match action.kind() {
                ActionKind::SendOutput { port, channel, .. } => match machine.output(port) {
                    None => checks.push(Validation::fail(StructuralViolation::UndeclaredOutput {
                        transition: name.to_string(),
                        port: port.clone(),
                    })),
                    Some(spec) => {
                        if let Some(channel) = channel.filter(|c| !spec.has_channel(*c)) {
                            checks.push(Validation::fail(
                                StructuralViolation::OutputChannelOutOfRange {
                                    transition: name.to_string(),
                                    port: port.clone(),
                                    channel,
                                    width: spec.width,
                                },
                            ));
                        }
                    }
                },
                ActionKind::SetVariable { name: variable, .. } => {
                    if !machine.parameters().contains_key(variable) {
                        checks.push(Validation::fail(StructuralViolation::UndeclaredVariable {
                            transition: name.to_string(),
                            name: variable.clone(),
                        }));
                    }
                }
                ActionKind::ResetRefinement => {}
            }
        }
    }
    checks
}

fn shadowing_checks(machine: &Machine) -> Vec<Validation<(), NonEmptyVec<StructuralViolation>>> {
    machine
        .parameters()
        .keys()
        .filter(|name| machine.input(name).is_some())
        .map(|name| {
            Validation::fail(StructuralViolation::VariableShadowsInput { name: name.clone() })
        })
        .collect()
}
