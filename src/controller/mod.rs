//! The transition-selection engine and its policies.
//!
//! [`FsmController`] owns a [`Machine`](crate::machine::Machine) and drives
//! it through firing cycles. Faults are reported as [`FiringFault`];
//! recoverable ones may be resolved by a [`RecoveryHandler`]. Committed
//! state changes are reported to an optional [`StateListener`].

mod boundary;
#[allow(clippy::module_inception)]
mod controller;
pub mod config;
pub mod error;
pub mod listener;
pub mod recovery;

pub use boundary::BoundaryEstimate;
pub use config::{ConfigError, FiringConfig, GuardFaultPolicy, DEFAULT_HISTORY_LIMIT};
pub use controller::{FsmController, StepResult};
pub use error::{FiringFault, Phase};
pub use listener::{StateChange, StateListener};
pub use recovery::{first_alternative, FirstAlternative, RecoveryHandler};
