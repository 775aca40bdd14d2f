//! Builder API for creating structure rules.

use crate::machine::Machine;
use crate::validation::rules::{StructureCheck, StructureRules};
use crate::validation::violations::StructuralViolation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for creating structure rules
pub struct StructureRulesBuilder {
    standard: bool,
    required_checks: Vec<StructureCheck>,
}

impl StructureRulesBuilder {
    pub fn new() -> Self {
        Self {
            standard: true,
            required_checks: Vec::new(),
        }
    }

    /// Include the standard rules (on by default)
    pub fn standard_rules(mut self, enabled: bool) -> Self {
        self.standard = enabled;
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&Machine) -> Validation<(), NonEmptyVec<StructuralViolation>> + Send + Sync + 'static,
    {
        self.required_checks.push(Box::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&Machine) -> bool + Send + Sync + 'static,
    {
        let check = move |machine: &Machine| {
            if predicate(machine) {
                Validation::success(())
            } else {
                Validation::fail(StructuralViolation::CustomCheckFailed {
                    message: error_msg.clone(),
                })
            }
        };
        self.required_checks.push(Box::new(check));
        self
    }

    pub fn build(self) -> StructureRules {
        StructureRules {
            standard: self.standard,
            required_checks: self.required_checks,
        }
    }
}

impl Default for StructureRulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
