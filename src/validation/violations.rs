//! Structural rule violations.

use thiserror::Error;

/// A structural rule a machine breaks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StructuralViolation {
    #[error("No initial state")]
    NoInitialState,

    #[error("More than one initial state: {}", .states.join(", "))]
    MultipleInitialStates { states: Vec<String> },

    #[error("Transition '{transition}': {reason}")]
    ActionCapability { transition: String, reason: String },

    #[error("Transition '{transition}' writes undeclared output '{port}'")]
    UndeclaredOutput { transition: String, port: String },

    #[error("Transition '{transition}' writes channel {channel} of '{port}' (width {width})")]
    OutputChannelOutOfRange {
        transition: String,
        port: String,
        channel: usize,
        width: usize,
    },

    #[error("Transition '{transition}' assigns undeclared variable '{name}'")]
    UndeclaredVariable { transition: String, name: String },

    #[error("Variable '{name}' shadows an input port of the same name")]
    VariableShadowsInput { name: String },

    #[error("Custom check failed: {message}")]
    CustomCheckFailed { message: String },
}
