//! Validation of machine structure.
//!
//! Rules are checked with Stillwater's `Validation` type, so a single pass
//! reports every violated rule instead of stopping at the first one.
//!
//! # Example
//!
//! ```rust
//! use modal_fsm::machine::Machine;
//! use modal_fsm::validation::{StructuralViolation, StructureRulesBuilder};
//!
//! let mut machine = Machine::new("empty");
//! machine.add_state("Only").unwrap();
//!
//! let rules = StructureRulesBuilder::new()
//!     .require_pred(|m| m.transitions().count() > 0, "no transitions".to_string())
//!     .build();
//!
//! let violations = rules.violations(&machine);
//! assert_eq!(violations.len(), 2);
//! assert_eq!(violations[0], StructuralViolation::NoInitialState);
//! ```

pub mod builder;
pub mod rules;
pub mod violations;

pub use builder::StructureRulesBuilder;
pub use rules::{StructureCheck, StructureRules};
pub use violations::StructuralViolation;
