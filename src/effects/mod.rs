//! The engine's boundaries to the outside world.
//!
//! The firing protocol itself is pure bookkeeping over the machine arena;
//! everything that touches the enclosing dataflow engine goes through the
//! traits in this module:
//!
//! - **Dataflow**: reading input tokens and writing output tokens on named,
//!   possibly multi-channel ports
//! - **Scope**: the read-only identifier view a guard or action evaluates in
//! - **Evaluator**: the opaque expression evaluator for guard and action
//!   strings

mod dataflow;
mod evaluator;
mod scope;

pub use dataflow::{Dataflow, PortMap};
pub use evaluator::{EvaluationError, Evaluator, NoEvaluator};
pub use scope::Scope;
