//! Firing policy supplied by the surrounding scheduler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transition records a controller keeps unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

/// How a guard evaluation failure is treated.
///
/// Model errors and unresolved references are never downgraded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardFaultPolicy {
    /// Abort the cycle with the fault.
    #[default]
    Propagate,
    /// Count the guard as false for this pass.
    TreatAsDisabled,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse firing config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid firing config: {0}")]
    Invalid(String),
}

/// Controller configuration.
///
/// # Example
///
/// ```rust
/// use modal_fsm::controller::{FiringConfig, GuardFaultPolicy};
///
/// let config = FiringConfig::from_json(
///     r#"{ "max_evaluate_passes": 4, "guard_fault_policy": "treat_as_disabled" }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.max_evaluate_passes, Some(4));
/// assert_eq!(config.guard_fault_policy, GuardFaultPolicy::TreatAsDisabled);
/// assert_eq!(config.relation_tolerance, 1e-4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiringConfig {
    /// Evaluate passes allowed per cycle; `None` is unlimited.
    pub max_evaluate_passes: Option<usize>,
    pub guard_fault_policy: GuardFaultPolicy,
    /// Relation differences smaller than this count as zero.
    pub relation_tolerance: f64,
    /// Reset the relation histories of the former state's transitions after
    /// a transition is taken.
    pub clear_relations_on_transition: bool,
    /// Number of transition records kept; `None` keeps every record.
    pub history_limit: Option<usize>,
}

impl Default for FiringConfig {
    fn default() -> Self {
        Self {
            max_evaluate_passes: None,
            guard_fault_policy: GuardFaultPolicy::Propagate,
            relation_tolerance: 1e-4,
            clear_relations_on_transition: false,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}

impl FiringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn max_evaluate_passes(mut self, passes: usize) -> Self {
        self.max_evaluate_passes = Some(passes);
        self
    }

    pub fn guard_fault_policy(mut self, policy: GuardFaultPolicy) -> Self {
        self.guard_fault_policy = policy;
        self
    }

    pub fn relation_tolerance(mut self, tolerance: f64) -> Self {
        self.relation_tolerance = tolerance;
        self
    }

    pub fn clear_relations_on_transition(mut self, clear: bool) -> Self {
        self.clear_relations_on_transition = clear;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Keep every transition record. Memory grows with each committed
    /// transition.
    pub fn unbounded_history(mut self) -> Self {
        self.history_limit = None;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.relation_tolerance.is_finite() || self.relation_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "relation_tolerance must be a non-negative number, got {}",
                self.relation_tolerance
            )));
        }
        if self.max_evaluate_passes == Some(0) {
            return Err(ConfigError::Invalid(
                "max_evaluate_passes must allow at least one pass".to_string(),
            ));
        }
        Ok(())
    }
}
