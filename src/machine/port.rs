//! Port declarations of a machine.

use serde::{Deserialize, Serialize};

/// A named port with `width` channels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    pub width: usize,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }

    pub fn has_channel(&self, channel: usize) -> bool {
        channel < self.width
    }
}
