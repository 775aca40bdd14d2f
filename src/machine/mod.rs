//! Structure of a modal model: states, guarded transitions and their
//! actions, stored in an arena owned by [`Machine`].
//!
//! States and transitions refer to each other through [`StateId`] and
//! [`TransitionId`] handles. Each handle carries the id of the machine that
//! issued it, so a handle from one machine is never resolved against
//! another.

pub mod action;
pub mod arena;
pub mod guard;
pub mod ids;
pub mod port;
pub mod refinement;
pub mod state;
pub mod transition;

pub use action::{Action, ActionKind, Capabilities, ValueExpr, ValueFn};
pub use arena::{Machine, Preemption};
pub use guard::{Comparison, Guard, GuardContext, GuardPredicate};
pub use ids::{StateId, TransitionId};
pub use port::PortSpec;
pub use refinement::{Refinement, RefinementError};
pub use state::State;
pub use transition::{Transition, TransitionConfig};
