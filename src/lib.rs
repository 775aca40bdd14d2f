//! Modal FSM: a hierarchical finite-state-machine firing engine
//!
//! The engine drives one discrete step of a state machine per invocation:
//! it evaluates the guards leaving the current state, selects at most one
//! enabled transition, runs its choice actions while the surrounding
//! scheduler iterates, and at commit runs its commit actions and moves to
//! the destination state. Each guard's relational sub-expressions are
//! tracked across steps so that continuous-time solvers can detect level
//! crossings and refine their step size.
//!
//! # Core Concepts
//!
//! - **Machine**: arena of states and transitions addressed by stable ids
//! - **Guards**: predicates that report their relations while deciding
//! - **Actions**: choice actions run per evaluate pass, commit actions run
//!   once per cycle
//! - **Relations**: per-guard history of threshold classifications
//! - **Controller**: the evaluate/commit protocol, with explicit faults and
//!   caller-supplied recovery
//!
//! # Example
//!
//! ```rust
//! use modal_fsm::builder::{MachineBuilder, TransitionBuilder};
//! use modal_fsm::controller::{FsmController, StepResult};
//! use modal_fsm::core::Value;
//! use modal_fsm::effects::PortMap;
//! use modal_fsm::machine::{Comparison, ValueExpr};
//!
//! let machine = MachineBuilder::new("heater")
//!     .input("temperature", 1)
//!     .output("power", 1)
//!     .state("Off")
//!     .state("On")
//!     .initial("Off")
//!     .transition(
//!         TransitionBuilder::new()
//!             .from("Off")
//!             .to("On")
//!             .when(|ctx| {
//!                 let t = ctx.number("temperature")?;
//!                 Ok(ctx.compare(t, Comparison::Less, 18.0))
//!             })
//!             .output("power", ValueExpr::literal(true)),
//!     )
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut controller = FsmController::new(machine);
//! controller.initialize().unwrap();
//!
//! let mut ports = PortMap::new();
//! ports.set_input("temperature", 0, 15.5);
//!
//! let result = controller.step(&mut ports).unwrap();
//! assert!(matches!(result, StepResult::Transitioned { .. }));
//! assert_eq!(controller.current_state_name(), Some("On"));
//! assert_eq!(ports.output("power", 0), Some(&Value::Boolean(true)));
//! ```

pub mod builder;
pub mod checkpoint;
pub mod controller;
pub mod core;
pub mod effects;
pub mod machine;
pub mod validation;

// Re-export commonly used types
pub use controller::{FiringConfig, FiringFault, FsmController, StepResult};
pub use core::{RelationList, RelationNode, RelationType, Value};
pub use machine::{Machine, StateId, TransitionId};
