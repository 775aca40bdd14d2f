//! Builder API for ergonomic machine construction.
//!
//! Builders refer to states by name and resolve them into arena ids when
//! the machine is built.

pub mod error;
pub mod machine;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::{TransitionBuilder, TransitionDecl};

/// Create an unconditional transition declaration.
///
/// # Example
///
/// ```
/// use modal_fsm::builder::{simple_transition, MachineBuilder};
///
/// let machine = MachineBuilder::new("blink")
///     .state("On")
///     .state("Off")
///     .initial("On")
///     .add_transition(simple_transition("On", "Off"))
///     .add_transition(simple_transition("Off", "On"))
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.transitions().count(), 2);
/// ```
pub fn simple_transition(from: impl Into<String>, to: impl Into<String>) -> TransitionDecl {
    TransitionDecl {
        from: from.into(),
        to: to.into(),
        config: Default::default(),
    }
}

/// Create a transition declaration guarded by an expression.
///
/// # Example
///
/// ```
/// use modal_fsm::builder::guarded_transition;
///
/// let decl = guarded_transition("Idle", "Busy", "request_isPresent");
/// assert_eq!(decl.config.guard.describe(), "request_isPresent");
/// ```
pub fn guarded_transition(
    from: impl Into<String>,
    to: impl Into<String>,
    expression: impl Into<String>,
) -> TransitionDecl {
    let mut decl = simple_transition(from, to);
    decl.config.guard = crate::machine::Guard::expression(expression);
    decl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_transition_is_always_enabled() {
        let decl = simple_transition("Start", "Middle");
        assert_eq!(decl.from, "Start");
        assert_eq!(decl.to, "Middle");
        assert_eq!(decl.config.guard.describe(), "true");
        assert!(!decl.config.preemptive);
    }
}
