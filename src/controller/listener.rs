//! Synchronous observers of committed state changes.

use crate::machine::{StateId, TransitionId};

/// A committed transition, as reported to listeners.
#[derive(Clone, Debug, PartialEq)]
pub struct StateChange {
    pub from: StateId,
    pub to: StateId,
    pub from_name: String,
    pub to_name: String,
    pub transition: TransitionId,
    pub transition_name: String,
    /// Index of the cycle that committed the transition.
    pub cycle: u64,
}

/// Notified after the current state changes, before relation commit.
pub trait StateListener {
    fn state_changed(&mut self, change: &StateChange);
}

impl<F> StateListener for F
where
    F: FnMut(&StateChange),
{
    fn state_changed(&mut self, change: &StateChange) {
        self(change)
    }
}
