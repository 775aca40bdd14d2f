//! Caller-supplied recovery from evaluate-phase faults.

use crate::controller::error::FiringFault;
use crate::machine::{Machine, TransitionId};

/// Chooses a substitute transition after a recoverable fault.
///
/// The controller only asks when the fault is recoverable (see
/// [`FiringFault::is_recoverable`]) and at least one alternative exists.
/// Alternatives are the enabled non-preemptive transitions of the current
/// state:
/// - for a guard fault, a faulted guard is never enabled, so the faulting
///   transition is not among them;
/// - for [`FiringFault::MultipleEnabledTransitions`] in the non-preemptive
///   tier, they are exactly the conflicting transitions;
/// - for a conflict among preemptive transitions, they are the enabled
///   non-preemptive transitions, not the conflicting ones.
///
/// Returning `None`, or an id outside `alternatives`, lets the fault
/// propagate.
pub trait RecoveryHandler {
    fn recover(
        &mut self,
        fault: &FiringFault,
        alternatives: &[TransitionId],
        machine: &Machine,
    ) -> Option<TransitionId>;
}

impl<F> RecoveryHandler for F
where
    F: FnMut(&FiringFault, &[TransitionId], &Machine) -> Option<TransitionId>,
{
    fn recover(
        &mut self,
        fault: &FiringFault,
        alternatives: &[TransitionId],
        machine: &Machine,
    ) -> Option<TransitionId> {
        self(fault, alternatives, machine)
    }
}

/// Handler that always takes the first alternative in declaration order.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstAlternative;

impl RecoveryHandler for FirstAlternative {
    fn recover(
        &mut self,
        _fault: &FiringFault,
        alternatives: &[TransitionId],
        _machine: &Machine,
    ) -> Option<TransitionId> {
        alternatives.first().copied()
    }
}

pub fn first_alternative() -> FirstAlternative {
    FirstAlternative
}
