//! History of committed transitions.
//!
//! Tracks the transitions a controller has taken, one record per committed
//! firing cycle that took a transition. `record` returns a new history;
//! the controller appends to its own with `push`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use modal_fsm::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: "Heating".to_string(),
///     to: "Cooling".to_string(),
///     transition: "Heating->Cooling".to_string(),
///     timestamp: Utc::now(),
///     cycle: 4,
/// };
/// assert_eq!(record.cycle, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Name of the state the machine left
    pub from: String,
    /// Name of the state the machine entered
    pub to: String,
    /// Name of the transition taken
    pub transition: String,
    /// When the commit happened
    pub timestamp: DateTime<Utc>,
    /// Firing cycle in which the transition was committed
    pub cycle: u64,
}

/// Ordered history of committed transitions.
///
/// `record` returns a new history with the transition added; `push`
/// appends in place. Either way at most `limit` records are kept, oldest
/// dropped first.
///
/// # Example
///
/// ```rust
/// use modal_fsm::core::{TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let history = TransitionHistory::new();
/// let history = history.record(TransitionRecord {
///     from: "Off".to_string(),
///     to: "On".to_string(),
///     transition: "Off->On".to_string(),
///     timestamp: Utc::now(),
///     cycle: 1,
/// });
/// let history = history.record(TransitionRecord {
///     from: "On".to_string(),
///     to: "Off".to_string(),
///     transition: "On->Off".to_string(),
///     timestamp: Utc::now(),
///     cycle: 2,
/// });
///
/// assert_eq!(history.path(), vec!["Off", "On", "Off"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    limit: Option<usize>,
}

impl TransitionHistory {
    /// Create a new empty, unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty history retaining at most `limit` records.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The oldest records are dropped once the limit is exceeded.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut history = self.clone();
        history.push(record);
        history
    }

    /// Append a transition in place, dropping the oldest records beyond
    /// the limit.
    pub fn push(&mut self, record: TransitionRecord) {
        self.records.push_back(record);
        if let Some(limit) = self.limit {
            while self.records.len() > limit {
                self.records.pop_front();
            }
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Names of the states traversed: the first source state, then the
    /// destination of each record.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|r| r.to.as_str()));
        path
    }

    /// Elapsed wall-clock time between the first and last record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Records from oldest to newest.
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
