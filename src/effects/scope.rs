//! Read-only variable scope seen by guards and actions.

use crate::core::Value;
use crate::effects::evaluator::EvaluationError;
use std::collections::BTreeMap;

const PRESENT_SUFFIX: &str = "_isPresent";

/// Snapshot of input tokens and machine variables for one evaluate pass.
///
/// Identifiers resolve in this order:
/// - `port`: token on channel 0 of an input port
/// - `port_isPresent`: whether channel 0 holds a token
/// - `port_<ch>` / `port_<ch>_isPresent`: the same for channel `<ch>`
/// - any machine variable
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
    inputs: BTreeMap<String, Vec<Option<Value>>>,
    variables: BTreeMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`set_input`](Self::set_input).
    pub fn with_input(mut self, port: impl Into<String>, channels: Vec<Option<Value>>) -> Self {
        self.set_input(port, channels);
        self
    }

    /// Builder-style variant of [`set_variable`](Self::set_variable).
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_variable(name, value);
        self
    }

    pub fn set_input(&mut self, port: impl Into<String>, channels: Vec<Option<Value>>) {
        self.inputs.insert(port.into(), channels);
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Token on `channel` of input `port`, if any.
    pub fn input(&self, port: &str, channel: usize) -> Option<&Value> {
        self.inputs
            .get(port)
            .and_then(|channels| channels.get(channel))
            .and_then(Option::as_ref)
    }

    pub fn is_present(&self, port: &str, channel: usize) -> bool {
        self.input(port, channel).is_some()
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &BTreeMap<String, Value> {
        &self.variables
    }

    /// Resolve an identifier following the scope's naming convention.
    pub fn lookup(&self, name: &str) -> Result<Value, EvaluationError> {
        if let Some(stem) = name.strip_suffix(PRESENT_SUFFIX) {
            if let Some((port, channel)) = self.resolve_port(stem) {
                return Ok(Value::Boolean(self.is_present(port, channel)));
            }
        } else if let Some((port, channel)) = self.resolve_port(name) {
            return self
                .input(port, channel)
                .cloned()
                .ok_or_else(|| EvaluationError::Absent {
                    name: name.to_string(),
                });
        }

        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| EvaluationError::Unresolved {
                name: name.to_string(),
            })
    }

    /// Numeric value of an identifier.
    pub fn number(&self, name: &str) -> Result<f64, EvaluationError> {
        let value = self.lookup(name)?;
        value.as_f64().ok_or_else(|| {
            EvaluationError::Type(format!(
                "'{name}' is a {}, expected a number",
                value.type_name()
            ))
        })
    }

    /// Boolean value of an identifier.
    pub fn flag(&self, name: &str) -> Result<bool, EvaluationError> {
        let value = self.lookup(name)?;
        value.as_bool().ok_or_else(|| {
            EvaluationError::Type(format!(
                "'{name}' is a {}, expected a boolean",
                value.type_name()
            ))
        })
    }

    fn resolve_port<'a>(&self, stem: &'a str) -> Option<(&'a str, usize)> {
        if self.inputs.contains_key(stem) {
            return Some((stem, 0));
        }
        let (port, channel) = stem.rsplit_once('_')?;
        let channel = channel.parse().ok()?;
        self.inputs.contains_key(port).then_some((port, channel))
    }
}
