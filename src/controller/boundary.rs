//! Level-crossing accuracy checks for continuous-time solvers.
//!
//! After an evaluate pass, a hybrid solver asks whether the step it just
//! took landed close enough to a guard threshold. The relations of the
//! enabled transitions, plus the first transition per tier whose relations
//! crossed, are inspected; the largest distance to a threshold decides.

use crate::machine::{Machine, TransitionId};
use tracing::debug;

/// Transitions inspected by one boundary estimate.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Candidates {
    pub(crate) enabled: Vec<TransitionId>,
    /// First transition of each evaluated tier with a relation event.
    pub(crate) with_event: Vec<TransitionId>,
}

impl Candidates {
    pub(crate) fn is_empty(&self) -> bool {
        self.enabled.is_empty() && self.with_event.is_empty()
    }
}

/// Outcome of
/// [`FsmController::estimate_boundary`](crate::controller::FsmController::estimate_boundary).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryEstimate {
    /// Largest distance to a threshold among relations that changed type.
    pub distance: f64,
    /// The same relation's distance at the last committed step.
    pub last_distance: f64,
    /// Transition owning that relation.
    pub transition: Option<TransitionId>,
    /// Whether `distance` is within the error tolerance.
    pub accurate: bool,
    /// An event was detected at an accurate step.
    pub has_event: bool,
}

impl BoundaryEstimate {
    fn quiet() -> Self {
        Self {
            distance: 0.0,
            last_distance: 0.0,
            transition: None,
            accurate: true,
            has_event: false,
        }
    }

    /// Step size that lands within half the tolerance of the threshold,
    /// assuming linear motion across the step. Accurate estimates keep
    /// `current`.
    pub fn refined_step_size(&self, current: f64, tolerance: f64) -> f64 {
        if self.accurate {
            return current;
        }
        let span = self.last_distance + self.distance;
        if span <= 0.0 {
            return current;
        }
        let refined = current * (self.last_distance + tolerance / 2.0) / span;
        refined.min(current)
    }
}

pub(crate) fn estimate(
    machine: &mut Machine,
    candidates: &Candidates,
    tolerance: f64,
) -> BoundaryEstimate {
    if candidates.is_empty() {
        return BoundaryEstimate::quiet();
    }

    let mut distance = f64::MIN_POSITIVE;
    let mut last_distance = 0.0;
    let mut transition = None;

    for id in candidates.enabled.iter().chain(&candidates.with_event) {
        let Some(candidate) = machine.transition_mut(*id) else {
            continue;
        };
        let relations = candidate.relation_list_mut();
        let candidate_distance = relations.maximum_difference();
        if candidate_distance > distance {
            distance = candidate_distance;
            last_distance = relations.former_maximum_distance();
            transition = Some(*id);
        }
    }

    let accurate = distance < tolerance;
    if transition.is_none() {
        distance = 0.0;
    }
    debug!(
        distance,
        last_distance,
        accurate,
        transition = ?transition,
        "estimated distance to guard boundary"
    );

    BoundaryEstimate {
        distance,
        last_distance,
        transition,
        accurate,
        has_event: accurate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inaccurate(distance: f64, last_distance: f64) -> BoundaryEstimate {
        BoundaryEstimate {
            distance,
            last_distance,
            transition: None,
            accurate: false,
            has_event: false,
        }
    }

    #[test]
    fn accurate_estimates_keep_the_step() {
        assert_eq!(BoundaryEstimate::quiet().refined_step_size(0.5, 1e-3), 0.5);
    }

    #[test]
    fn refinement_interpolates_toward_the_threshold() {
        // Crossed 3.0 past a threshold that was 1.0 away: shrink to ~1/4.
        let refined = inaccurate(3.0, 1.0).refined_step_size(1.0, 0.0);
        assert!((refined - 0.25).abs() < 1e-12);
    }

    #[test]
    fn refinement_never_grows_the_step() {
        let refined = inaccurate(0.1, 10.0).refined_step_size(1.0, 1.0);
        assert_eq!(refined, 1.0);
    }

    #[test]
    fn empty_candidates_are_accurate_without_event() {
        let mut machine = Machine::new("m");
        let estimate = estimate(&mut machine, &Candidates::default(), 1e-3);
        assert!(estimate.accurate);
        assert!(!estimate.has_event);
    }
}
