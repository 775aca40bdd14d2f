//! Ordered relation tracking for one transition guard.

use super::relation::{RelationNode, RelationType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by [`RelationList`] operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RelationError {
    #[error("Relation index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// The relations of one guard, in the order the guard evaluates them.
///
/// Positions are significant: the guard evaluator addresses relations by
/// index, so the order in which relations are added must match the order in
/// which the guard produces them.
///
/// # Example
///
/// ```rust
/// use modal_fsm::core::{RelationList, RelationType};
///
/// let mut relations = RelationList::new();
/// relations.add_relation(RelationType::LessThan, -0.2);
/// relations.commit_relation_values();
///
/// relations.set_relation(0, RelationType::GreaterThan, 0.1).unwrap();
/// assert!(relations.has_event());
/// assert_eq!(relations.maximum_difference(), 0.1);
/// assert_eq!(relations.maximum_difference_index(), Some(0));
/// assert_eq!(relations.former_maximum_distance(), 0.2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationList {
    relations: Vec<RelationNode>,
    #[serde(skip)]
    maximum_difference_index: Option<usize>,
}

impl RelationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a relation with no history.
    pub fn add_relation(&mut self, relation_type: RelationType, difference: f64) {
        self.relations
            .push(RelationNode::new(relation_type, difference));
    }

    /// Update the current round of the relation at `index`.
    pub fn set_relation(
        &mut self,
        index: usize,
        relation_type: RelationType,
        difference: f64,
    ) -> Result<(), RelationError> {
        let len = self.relations.len();
        let node = self
            .relations
            .get_mut(index)
            .ok_or(RelationError::IndexOutOfBounds { index, len })?;
        node.update(relation_type, difference);
        Ok(())
    }

    /// Largest `|difference|` among relations whose classification changed
    /// this round, or `0.0` if none changed.
    ///
    /// Records the index of the winning relation for
    /// [`maximum_difference_index`](Self::maximum_difference_index). Relations
    /// whose type did not change are ignored however large their distance.
    pub fn maximum_difference(&mut self) -> f64 {
        let mut maximum = 0.0;
        let mut winner = None;
        for (index, node) in self.relations.iter().enumerate() {
            if !node.type_changed() {
                continue;
            }
            let distance = node.difference().abs();
            if winner.is_none() || distance > maximum {
                maximum = distance;
                winner = Some(index);
            }
        }
        self.maximum_difference_index = winner;
        maximum
    }

    /// Index recorded by the latest [`maximum_difference`](Self::maximum_difference).
    ///
    /// Stale if relations were updated since that call.
    pub fn maximum_difference_index(&self) -> Option<usize> {
        self.maximum_difference_index
    }

    /// Committed distance of the relation at the recorded maximum index.
    pub fn former_maximum_distance(&self) -> f64 {
        self.maximum_difference_index
            .and_then(|index| self.relations.get(index))
            .map_or(0.0, RelationNode::previous_difference)
    }

    /// True iff any relation crossed its threshold.
    pub fn has_event(&self) -> bool {
        self.relations.iter().any(RelationNode::has_event)
    }

    /// Roll every relation's current round into history.
    pub fn commit_relation_values(&mut self) {
        self.relations.iter_mut().for_each(RelationNode::commit);
    }

    /// Discard the history of every relation.
    pub fn clear_relation_list(&mut self) {
        self.relations.iter_mut().for_each(RelationNode::reset);
    }

    /// Drop every relation, e.g. after the guard was replaced.
    pub fn destroy(&mut self) {
        self.relations.clear();
        self.maximum_difference_index = None;
    }

    pub fn get(&self, index: usize) -> Option<&RelationNode> {
        self.relations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationNode> {
        self.relations.iter()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
