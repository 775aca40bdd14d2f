//! The machine arena: states and transitions indexed by stable ids.

use crate::controller::FiringFault;
use crate::core::Value;
use crate::machine::guard::Guard;
use crate::machine::ids::{StateId, TransitionId};
use crate::machine::port::PortSpec;
use crate::machine::refinement::Refinement;
use crate::machine::state::State;
use crate::machine::transition::{Transition, TransitionConfig};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Which outgoing transitions to list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preemption {
    #[default]
    Any,
    PreemptiveOnly,
    NonPreemptiveOnly,
}

impl Preemption {
    fn admits(self, transition: &Transition) -> bool {
        match self {
            Self::Any => true,
            Self::PreemptiveOnly => transition.is_preemptive(),
            Self::NonPreemptiveOnly => !transition.is_preemptive(),
        }
    }
}

/// States, transitions, ports and variables of one state machine.
///
/// Removed states and transitions leave an empty slot, so ids handed out
/// earlier never alias a newer element.
///
/// # Example
///
/// ```rust
/// use modal_fsm::machine::{Guard, Machine, TransitionConfig};
///
/// let mut machine = Machine::new("switch");
/// let off = machine.add_state("Off").unwrap();
/// let on = machine.add_state("On").unwrap();
/// machine.set_initial(off).unwrap();
///
/// let flip = machine
///     .add_transition(off, on, TransitionConfig {
///         guard: Guard::expression("button"),
///         ..TransitionConfig::default()
///     })
///     .unwrap();
///
/// assert_eq!(machine.transition(flip).unwrap().name(), "Off->On");
/// assert_eq!(machine.nonpreemptive_transition_list(off), vec![flip]);
/// ```
pub struct Machine {
    id: Uuid,
    name: String,
    states: Vec<Option<State>>,
    transitions: Vec<Option<Transition>>,
    inputs: Vec<PortSpec>,
    outputs: Vec<PortSpec>,
    parameters: BTreeMap<String, Value>,
}

impl Machine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            states: Vec::new(),
            transitions: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Ports and variables

    pub fn add_input(&mut self, name: impl Into<String>, width: usize) -> Result<(), FiringFault> {
        let port = PortSpec::new(name, width);
        self.ensure_port_name_free(&port.name)?;
        self.inputs.push(port);
        Ok(())
    }

    pub fn add_output(&mut self, name: impl Into<String>, width: usize) -> Result<(), FiringFault> {
        let port = PortSpec::new(name, width);
        self.ensure_port_name_free(&port.name)?;
        self.outputs.push(port);
        Ok(())
    }

    pub fn inputs(&self) -> &[PortSpec] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortSpec] {
        &self.outputs
    }

    pub fn input(&self, name: &str) -> Option<&PortSpec> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&PortSpec> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Declare a variable with its initial value.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.parameters.insert(name.into(), value.into());
    }

    /// Declared variables and their initial values.
    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    // States

    pub fn add_state(&mut self, name: impl Into<String>) -> Result<StateId, FiringFault> {
        let name = name.into();
        if self.state_by_name(&name).is_some() {
            return Err(FiringFault::structural(format!(
                "state '{name}' already exists in machine '{}'",
                self.name
            )));
        }
        let id = StateId::new(self.id, self.states.len());
        self.states.push(Some(State::new(id, name)));
        Ok(id)
    }

    /// Remove a state, first removing every transition into or out of it.
    pub fn remove_state(&mut self, id: StateId) -> Result<State, FiringFault> {
        let state = self.state_checked(id)?;
        let incident: Vec<TransitionId> = state
            .outgoing()
            .iter()
            .chain(state.incoming())
            .copied()
            .collect();
        for transition in incident {
            // Self-loops appear in both lists.
            if self.transition(transition).is_some() {
                self.remove_transition(transition)?;
            }
        }
        self.states[id.index()]
            .take()
            .ok_or_else(|| FiringFault::structural(format!("no {id} in machine '{}'", self.name)))
    }

    /// Mark `id` as the only initial state.
    pub fn set_initial(&mut self, id: StateId) -> Result<(), FiringFault> {
        self.state_checked(id)?;
        for state in self.states.iter_mut().flatten() {
            state.set_initial(state.id() == id);
        }
        Ok(())
    }

    pub fn initial_state(&self) -> Option<StateId> {
        self.states().find(|s| s.is_initial()).map(State::id)
    }

    /// Bind, replace or clear the refinement of a state, returning the old one.
    pub fn set_refinement(
        &mut self,
        id: StateId,
        refinement: Option<Box<dyn Refinement>>,
    ) -> Result<Option<Box<dyn Refinement>>, FiringFault> {
        Ok(self.state_checked_mut(id)?.set_refinement(refinement))
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        if id.machine() != self.id {
            return None;
        }
        self.states.get(id.index()).and_then(Option::as_ref)
    }

    pub fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        if id.machine() != self.id {
            return None;
        }
        self.states.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn state_by_name(&self, name: &str) -> Option<StateId> {
        self.states().find(|s| s.name() == name).map(State::id)
    }

    /// Live states in creation order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter().flatten()
    }

    // Transitions

    /// Add a transition from `source` to `destination` (self-loops allowed).
    pub fn add_transition(
        &mut self,
        source: StateId,
        destination: StateId,
        config: TransitionConfig,
    ) -> Result<TransitionId, FiringFault> {
        let source_name = self.state_checked(source)?.name().to_string();
        let destination_name = self.state_checked(destination)?.name().to_string();

        if let Some(reason) = config.actions.iter().find_map(|a| a.capability_violation()) {
            return Err(FiringFault::structural(reason));
        }

        let name = match config.name.clone() {
            Some(name) => {
                if self.transition_by_name(&name).is_some() {
                    return Err(FiringFault::structural(format!(
                        "transition '{name}' already exists in machine '{}'",
                        self.name
                    )));
                }
                name
            }
            None => self.unique_transition_name(&format!("{source_name}->{destination_name}")),
        };

        let id = TransitionId::new(self.id, self.transitions.len());
        self.transitions
            .push(Some(Transition::new(id, name, source, destination, config)));
        self.state_checked_mut(source)?.attach_outgoing(id);
        self.state_checked_mut(destination)?.attach_incoming(id);
        Ok(id)
    }

    /// Detach a transition from both endpoints and remove it.
    pub fn remove_transition(&mut self, id: TransitionId) -> Result<Transition, FiringFault> {
        let transition = self.transition_checked(id)?;
        let (source, destination) = (transition.source_state(), transition.destination_state());
        if let Some(state) = self.state_mut(source) {
            state.detach(id);
        }
        if let Some(state) = self.state_mut(destination) {
            state.detach(id);
        }
        self.transitions[id.index()]
            .take()
            .ok_or_else(|| FiringFault::structural(format!("no {id} in machine '{}'", self.name)))
    }

    /// Replace a transition's guard, discarding its relation list.
    pub fn set_guard(&mut self, id: TransitionId, guard: Guard) -> Result<(), FiringFault> {
        self.transition_checked_mut(id)?.set_guard(guard);
        Ok(())
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        if id.machine() != self.id {
            return None;
        }
        self.transitions.get(id.index()).and_then(Option::as_ref)
    }

    pub fn transition_mut(&mut self, id: TransitionId) -> Option<&mut Transition> {
        if id.machine() != self.id {
            return None;
        }
        self.transitions.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn transition_by_name(&self, name: &str) -> Option<TransitionId> {
        self.transitions()
            .find(|t| t.name() == name)
            .map(Transition::id)
    }

    /// Live transitions in creation order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().flatten()
    }

    pub fn transitions_mut(&mut self) -> impl Iterator<Item = &mut Transition> {
        self.transitions.iter_mut().flatten()
    }

    /// Outgoing transitions of `state` in declaration order, filtered by
    /// their preemptive flag.
    pub fn outgoing_transitions(&self, state: StateId, filter: Preemption) -> Vec<TransitionId> {
        let Some(state) = self.state(state) else {
            return Vec::new();
        };
        state
            .outgoing()
            .iter()
            .filter(|id| self.transition(**id).is_some_and(|t| filter.admits(t)))
            .copied()
            .collect()
    }

    pub fn preemptive_transition_list(&self, state: StateId) -> Vec<TransitionId> {
        self.outgoing_transitions(state, Preemption::PreemptiveOnly)
    }

    pub fn nonpreemptive_transition_list(&self, state: StateId) -> Vec<TransitionId> {
        self.outgoing_transitions(state, Preemption::NonPreemptiveOnly)
    }

    pub(crate) fn state_checked(&self, id: StateId) -> Result<&State, FiringFault> {
        self.ensure_owned(id.machine(), &id.to_string())?;
        self.state(id)
            .ok_or_else(|| FiringFault::structural(format!("no {id} in machine '{}'", self.name)))
    }

    pub(crate) fn state_checked_mut(&mut self, id: StateId) -> Result<&mut State, FiringFault> {
        self.ensure_owned(id.machine(), &id.to_string())?;
        let name = self.name.clone();
        self.state_mut(id)
            .ok_or_else(|| FiringFault::structural(format!("no {id} in machine '{name}'")))
    }

    pub(crate) fn transition_checked(&self, id: TransitionId) -> Result<&Transition, FiringFault> {
        self.ensure_owned(id.machine(), &id.to_string())?;
        self.transition(id)
            .ok_or_else(|| FiringFault::structural(format!("no {id} in machine '{}'", self.name)))
    }

    pub(crate) fn transition_checked_mut(
        &mut self,
        id: TransitionId,
    ) -> Result<&mut Transition, FiringFault> {
        self.ensure_owned(id.machine(), &id.to_string())?;
        let name = self.name.clone();
        self.transition_mut(id)
            .ok_or_else(|| FiringFault::structural(format!("no {id} in machine '{name}'")))
    }

    fn ensure_owned(&self, owner: Uuid, what: &str) -> Result<(), FiringFault> {
        if owner == self.id {
            Ok(())
        } else {
            Err(FiringFault::structural(format!(
                "{what} belongs to another machine than '{}'",
                self.name
            )))
        }
    }

    fn ensure_port_name_free(&self, name: &str) -> Result<(), FiringFault> {
        if self.input(name).is_some() || self.output(name).is_some() {
            return Err(FiringFault::structural(format!(
                "port '{name}' already exists in machine '{}'",
                self.name
            )));
        }
        Ok(())
    }

    fn unique_transition_name(&self, base: &str) -> String {
        if self.transition_by_name(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}#{n}"))
            .find(|candidate| self.transition_by_name(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("states", &self.states().map(State::name).collect::<Vec<_>>())
            .field(
                "transitions",
                &self.transitions().map(Transition::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
