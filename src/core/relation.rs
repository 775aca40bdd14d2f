//! Classification of a single relational sub-expression of a guard.
//!
//! A guard such as `x > 5 && y == 0` contains two relations. Each of them is
//! tracked by a [`RelationNode`] across successive evaluation rounds so that a
//! continuous-valued signal crossing a threshold between two samples can be
//! detected even though neither sample is exactly on the threshold.

use serde::{Deserialize, Serialize};

/// Classification of a relation in one evaluation round.
///
/// The numeric codes are part of the contract: the product of the
/// [`LessThan`](RelationType::LessThan) and
/// [`GreaterThan`](RelationType::GreaterThan) codes is the only product of two
/// codes equal to [`CROSSING_SIGNATURE`], which is how a threshold crossing is
/// told apart from any other change of classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    /// No committed history.
    #[default]
    Invalid,
    /// Boolean leaf that evaluated to true.
    True,
    /// Boolean leaf that evaluated to false.
    False,
    /// Result of an `==` or `!=` comparison.
    EqualInequal,
    /// Left operand below the right operand.
    LessThan,
    /// Left operand at or above the right operand.
    GreaterThan,
}

/// Product of the `LessThan` and `GreaterThan` codes.
pub const CROSSING_SIGNATURE: u32 =
    RelationType::LessThan.code() * RelationType::GreaterThan.code();

impl RelationType {
    /// Numeric code of this classification.
    pub const fn code(self) -> u32 {
        match self {
            Self::Invalid => 0,
            Self::True => 1,
            Self::False => 2,
            Self::EqualInequal => 3,
            Self::LessThan => 4,
            Self::GreaterThan => 5,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Invalid),
            1 => Some(Self::True),
            2 => Some(Self::False),
            3 => Some(Self::EqualInequal),
            4 => Some(Self::LessThan),
            5 => Some(Self::GreaterThan),
            _ => None,
        }
    }

    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }
}

/// Current and previous classification of one relation.
///
/// `update` only touches the current round. History moves forward with
/// `commit` and is discarded with `reset`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelationNode {
    current_type: RelationType,
    difference: f64,
    previous_type: RelationType,
    previous_difference: f64,
}

impl RelationNode {
    /// Create a node whose first round is `(relation_type, difference)` and
    /// which has no history yet.
    pub fn new(relation_type: RelationType, difference: f64) -> Self {
        Self {
            current_type: relation_type,
            difference,
            previous_type: RelationType::Invalid,
            previous_difference: 0.0,
        }
    }

    /// Record this round's classification and signed distance.
    pub fn update(&mut self, relation_type: RelationType, difference: f64) {
        self.current_type = relation_type;
        self.difference = difference;
    }

    /// Roll the current round into history.
    pub fn commit(&mut self) {
        self.previous_type = self.current_type;
        self.previous_difference = self.difference;
    }

    /// Discard history.
    pub fn reset(&mut self) {
        self.previous_type = RelationType::Invalid;
        self.previous_difference = 0.0;
    }

    /// True iff there is history and the classification differs from it.
    pub fn type_changed(&self) -> bool {
        self.previous_type.is_valid() && self.previous_type != self.current_type
    }

    /// True iff the relation crossed its threshold since the last commit.
    ///
    /// A change between `True` and `False`, or from `Invalid`, is not an event.
    pub fn has_event(&self) -> bool {
        self.type_changed()
            && self.previous_type.code() * self.current_type.code() == CROSSING_SIGNATURE
    }

    pub fn current_type(&self) -> RelationType {
        self.current_type
    }

    pub fn previous_type(&self) -> RelationType {
        self.previous_type
    }

    /// Signed distance from the threshold in the current round.
    pub fn difference(&self) -> f64 {
        self.difference
    }

    /// Magnitude of the distance recorded at the last commit.
    pub fn previous_difference(&self) -> f64 {
        self.previous_difference.abs()
    }
}
