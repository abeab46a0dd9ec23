//! Shared whole-schedule evaluation.
//!
//! A pairwise conflict is counted once per overlapping same-day pair and
//! per shared resource: non-remote venue, lecturer, non-null group. One
//! pair may therefore contribute up to 3. Pairs against pinned bookings
//! count the same way; pinned-pinned pairs do not count.

use crate::config::EvaluationConfig;
use crate::models::{Placement, ScheduleSolution, SessionAssignment};

use super::SearchSpace;

/// Number of exclusive resources shared by two overlapping assignments.
pub fn shared_resources(a: &SessionAssignment, b: &SessionAssignment) -> usize {
    if !a.interval.overlaps(&b.interval) {
        return 0;
    }
    let venue = !a.venue_is_remote && !b.venue_is_remote && a.venue == b.venue;
    let lecturer = a.lecturer == b.lecturer;
    let group = matches!(
        (&a.session_ref.group_id, &b.session_ref.group_id),
        (Some(x), Some(y)) if x == y
    );
    usize::from(venue) + usize::from(lecturer) + usize::from(group)
}

/// Pairwise conflicts of `placements`, including those against pinned bookings.
pub fn count_conflicts(space: &SearchSpace, placements: &[Placement]) -> usize {
    let assigned = space.to_assignments(placements);
    let mut conflicts = 0;
    for (i, a) in assigned.iter().enumerate() {
        conflicts += assigned[i + 1..]
            .iter()
            .map(|b| shared_resources(a, b))
            .sum::<usize>();
        conflicts += space
            .pinned()
            .iter()
            .map(|p| shared_resources(a, p))
            .sum::<usize>();
    }
    conflicts
}

/// Conflicts introduced by placing session `i` at `placement`, given the
/// already-fixed `fixed` assignments and the pinned bookings.
pub fn conflicts_with_fixed(
    space: &SearchSpace,
    i: usize,
    placement: Placement,
    fixed: &[SessionAssignment],
) -> usize {
    let candidate = space.assignment(i, placement);
    fixed
        .iter()
        .chain(space.pinned())
        .map(|other| shared_resources(&candidate, other))
        .sum()
}

/// `base_score − conflict_weight × conflicts`.
pub fn score(config: &EvaluationConfig, conflicts: usize) -> f64 {
    config.base_score - config.conflict_weight * conflicts as f64
}

/// Fills in `conflicts` and `score` of a solution.
pub fn evaluate(space: &SearchSpace, config: &EvaluationConfig, solution: &mut ScheduleSolution) {
    solution.conflicts = count_conflicts(space, &solution.placements);
    solution.score = score(config, solution.conflicts);
}
