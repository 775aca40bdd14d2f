//! Boundary to the enclosing dataflow engine's ports.

use crate::core::Value;
use std::collections::BTreeMap;

/// Port access provided by the surrounding engine.
///
/// Reads return the latest token on a channel without consuming it; writes
/// overwrite whatever was sent on the channel earlier in the same cycle.
///
/// `read_output` and `clear_output` let the controller put a channel back
/// the way it found it when a cycle is aborted.
pub trait Dataflow {
    fn read_input(&mut self, port: &str, channel: usize) -> Option<Value>;

    fn write_output(&mut self, port: &str, channel: usize, value: Value);

    /// Value currently held on an output channel, if any.
    fn read_output(&self, port: &str, channel: usize) -> Option<Value>;

    /// Retract whatever was written on an output channel.
    fn clear_output(&mut self, port: &str, channel: usize);
}

/// In-memory [`Dataflow`] used by drivers and tests.
///
/// # Example
///
/// ```rust
/// use modal_fsm::core::Value;
/// use modal_fsm::effects::{Dataflow, PortMap};
///
/// let mut ports = PortMap::new();
/// ports.set_input("x", 0, 4.0);
/// assert_eq!(ports.read_input("x", 0), Some(Value::Double(4.0)));
///
/// ports.write_output("y", 1, Value::Boolean(true));
/// assert_eq!(ports.output("y", 1), Some(&Value::Boolean(true)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortMap {
    inputs: BTreeMap<(String, usize), Value>,
    outputs: BTreeMap<(String, usize), Value>,
    writes: usize,
}

impl PortMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, port: &str, channel: usize, value: impl Into<Value>) {
        self.inputs.insert((port.to_string(), channel), value.into());
    }

    pub fn clear_input(&mut self, port: &str, channel: usize) {
        self.inputs.remove(&(port.to_string(), channel));
    }

    pub fn clear_inputs(&mut self) {
        self.inputs.clear();
    }

    pub fn output(&self, port: &str, channel: usize) -> Option<&Value> {
        self.outputs.get(&(port.to_string(), channel))
    }

    /// Every `(port, channel) -> value` written so far.
    pub fn outputs(&self) -> &BTreeMap<(String, usize), Value> {
        &self.outputs
    }

    pub fn clear_outputs(&mut self) {
        self.outputs.clear();
    }

    /// Number of `write_output` calls since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Dataflow for PortMap {
    fn read_input(&mut self, port: &str, channel: usize) -> Option<Value> {
        self.inputs.get(&(port.to_string(), channel)).cloned()
    }

    fn write_output(&mut self, port: &str, channel: usize, value: Value) {
        self.writes += 1;
        self.outputs.insert((port.to_string(), channel), value);
    }

    fn read_output(&self, port: &str, channel: usize) -> Option<Value> {
        self.output(port, channel).cloned()
    }

    fn clear_output(&mut self, port: &str, channel: usize) {
        self.outputs.remove(&(port.to_string(), channel));
    }
}
