//! States of a machine.

use crate::machine::ids::{StateId, TransitionId};
use crate::machine::refinement::Refinement;
use std::fmt;

/// A node of the machine.
///
/// Holds the ids of its incident transitions in declaration order and an
/// optional refinement. Filtering outgoing transitions by preemption needs
/// the transitions themselves, so that lives on
/// [`Machine`](crate::machine::Machine).
pub struct State {
    id: StateId,
    name: String,
    outgoing: Vec<TransitionId>,
    incoming: Vec<TransitionId>,
    refinement: Option<Box<dyn Refinement>>,
    initial: bool,
}

impl State {
    pub(crate) fn new(id: StateId, name: String) -> Self {
        Self {
            id,
            name,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            refinement: None,
            initial: false,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outgoing transitions in declaration order.
    pub fn outgoing(&self) -> &[TransitionId] {
        &self.outgoing
    }

    pub fn incoming(&self) -> &[TransitionId] {
        &self.incoming
    }

    pub fn refinement(&self) -> Option<&dyn Refinement> {
        self.refinement.as_deref()
    }

    pub fn refinement_mut(&mut self) -> Option<&mut (dyn Refinement + 'static)> {
        self.refinement.as_deref_mut()
    }

    pub fn has_refinement(&self) -> bool {
        self.refinement.is_some()
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub(crate) fn set_initial(&mut self, initial: bool) {
        self.initial = initial;
    }

    pub(crate) fn set_refinement(
        &mut self,
        refinement: Option<Box<dyn Refinement>>,
    ) -> Option<Box<dyn Refinement>> {
        std::mem::replace(&mut self.refinement, refinement)
    }

    pub(crate) fn attach_outgoing(&mut self, transition: TransitionId) {
        self.outgoing.push(transition);
    }

    pub(crate) fn attach_incoming(&mut self, transition: TransitionId) {
        self.incoming.push(transition);
    }

    pub(crate) fn detach(&mut self, transition: TransitionId) {
        self.outgoing.retain(|t| *t != transition);
        self.incoming.retain(|t| *t != transition);
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("outgoing", &self.outgoing)
            .field("incoming", &self.incoming)
            .field("refinement", &self.refinement.is_some())
            .field("initial", &self.initial)
            .finish()
    }
}
