//! Stable arena identifiers.

use std::fmt;
use uuid::Uuid;

/// Handle to a state inside one [`Machine`](crate::machine::Machine).
///
/// Ids carry the owning machine's identity so that a handle obtained from
/// one machine is rejected by every other machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId {
    machine: Uuid,
    index: usize,
}

/// Handle to a transition inside one [`Machine`](crate::machine::Machine).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId {
    machine: Uuid,
    index: usize,
}

impl StateId {
    pub(crate) fn new(machine: Uuid, index: usize) -> Self {
        Self { machine, index }
    }

    pub fn machine(&self) -> Uuid {
        self.machine
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl TransitionId {
    pub(crate) fn new(machine: Uuid, index: usize) -> Self {
        Self { machine, index }
    }

    pub fn machine(&self) -> Uuid {
        self.machine
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.index)
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transition#{}", self.index)
    }
}
