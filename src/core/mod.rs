//! Pure data core of the engine.
//!
//! This module contains the parts with no dependency on the machine arena:
//! - Relation tracking (`RelationNode`, `RelationList`) for level-crossing
//!   detection in continuous-valued guards
//! - `Value` tokens exchanged with the dataflow graph
//! - Immutable transition history
//!
//! Nothing in this module performs I/O or calls back into user code.

mod history;
mod relation;
mod relation_list;
mod value;

pub use history::{TransitionHistory, TransitionRecord};
pub use relation::{RelationNode, RelationType, CROSSING_SIGNATURE};
pub use relation_list::{RelationError, RelationList};
pub use value::Value;
