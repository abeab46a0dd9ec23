//! Assignment and solution models.
//!
//! A [`SessionAssignment`] is a concrete placement of one session: a time
//! interval, a venue and a delivery mode. It carries the session's
//! identifiers so it can be persisted and conflict-checked on its own.
//!
//! A [`ScheduleSolution`] is the compact, index-based form the solvers work
//! on: one [`Placement`] per session, resolved against a shared search space.

use serde::{Deserialize, Serialize};

use super::{DeliveryMode, ResourceKey, SessionRef, SessionSpec, TimeInterval, Venue};

/// A session placed at a concrete time, venue and mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAssignment {
    /// Placed session.
    pub session_ref: SessionRef,
    /// Lecturer (denormalized from the `SessionSpec`).
    pub lecturer: String,
    /// When the session runs.
    pub interval: TimeInterval,
    /// Venue name.
    pub venue: String,
    /// Venue location label.
    pub location: String,
    /// Whether the venue is remote (exempt from venue conflicts).
    pub venue_is_remote: bool,
    /// Delivery mode.
    pub mode: DeliveryMode,
}

impl SessionAssignment {
    /// Places `spec` at `interval` in `venue` with `mode`.
    pub fn new(spec: &SessionSpec, interval: TimeInterval, venue: &Venue, mode: DeliveryMode) -> Self {
        Self {
            session_ref: spec.session_ref.clone(),
            lecturer: spec.lecturer.clone(),
            interval,
            venue: venue.name.clone(),
            location: venue.location.clone(),
            venue_is_remote: venue.is_remote,
            mode,
        }
    }

    /// Unit identifier.
    pub fn unit_id(&self) -> &str {
        &self.session_ref.unit_id
    }

    /// Group identifier, if any.
    pub fn group_id(&self) -> Option<&str> {
        self.session_ref.group_id.as_deref()
    }

    /// Resources this assignment holds exclusively: the lecturer, the venue
    /// unless remote, and the group when present.
    pub fn hard_keys(&self) -> Vec<ResourceKey> {
        let mut keys = vec![ResourceKey::Lecturer(self.lecturer.clone())];
        if !self.venue_is_remote {
            keys.push(ResourceKey::Venue(self.venue.clone()));
        }
        if let Some(group) = &self.session_ref.group_id {
            keys.push(ResourceKey::Group(group.clone()));
        }
        keys
    }

    /// Resources shared with `other` during overlapping time.
    ///
    /// Empty when the intervals do not overlap.
    pub fn conflicts_with(&self, other: &Self) -> Vec<ResourceKey> {
        if !self.interval.overlaps(&other.interval) {
            return Vec::new();
        }
        let theirs = other.hard_keys();
        self.hard_keys()
            .into_iter()
            .filter(|k| theirs.contains(k))
            .collect()
    }
}

/// One hard-constraint violation between two assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// First session of the pair.
    pub first: SessionRef,
    /// Second session of the pair.
    pub second: SessionRef,
    /// Shared resource.
    pub resource: ResourceKey,
    /// Interval of the first session.
    pub interval: TimeInterval,
}

/// Detects all pairwise hard conflicts in a set of assignments.
///
/// One pair may produce up to three conflicts (lecturer, venue, group).
pub fn detect_conflicts(assignments: &[SessionAssignment]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (i, a) in assignments.iter().enumerate() {
        for b in &assignments[i + 1..] {
            for resource in a.conflicts_with(b) {
                conflicts.push(Conflict {
                    first: a.session_ref.clone(),
                    second: b.session_ref.clone(),
                    resource,
                    interval: a.interval,
                });
            }
        }
    }
    conflicts
}

/// Index-based placement of one session inside a search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Index into the slot catalog.
    pub slot: usize,
    /// Index into the venue list.
    pub venue: usize,
    /// Delivery mode.
    pub mode: DeliveryMode,
}

impl Placement {
    /// Creates a placement.
    pub fn new(slot: usize, venue: usize, mode: DeliveryMode) -> Self {
        Self { slot, venue, mode }
    }
}

/// A complete session → placement mapping plus its evaluation.
///
/// `placements[i]` belongs to the i-th session of the problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSolution {
    /// Placement per session.
    pub placements: Vec<Placement>,
    /// Pairwise hard conflicts (derived).
    pub conflicts: usize,
    /// Solver score (derived; higher = better).
    pub score: f64,
}

impl ScheduleSolution {
    /// Wraps placements; call the evaluator to fill `conflicts`/`score`.
    pub fn new(placements: Vec<Placement>) -> Self {
        Self {
            placements,
            conflicts: 0,
            score: f64::NEG_INFINITY,
        }
    }

    /// Number of placed sessions.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether no session is placed.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Whether the solution has no hard conflicts.
    pub fn is_feasible(&self) -> bool {
        self.conflicts == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;

    fn spec(unit: &str, lecturer: &str) -> SessionSpec {
        SessionSpec::simple(unit, "C1", lecturer, 2, DeliveryMode::Physical)
    }

    #[test]
    fn test_hard_keys() {
        let room = Venue::new("R1", 40);
        let a = SessionAssignment::new(
            &spec("U1", "L1").with_group("G1"),
            TimeInterval::hours(Day::Monday, 8, 10),
            &room,
            DeliveryMode::Physical,
        );
        let keys = a.hard_keys();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&ResourceKey::venue("R1")));

        let online = SessionAssignment::new(
            &spec("U1", "L1"),
            TimeInterval::hours(Day::Monday, 8, 10),
            &Venue::remote(),
            DeliveryMode::Online,
        );
        assert_eq!(online.hard_keys(), vec![ResourceKey::lecturer("L1")]);
    }

    #[test]
    fn test_conflicts_with_shared_lecturer() {
        let a = SessionAssignment::new(
            &spec("U1", "L1"),
            TimeInterval::hours(Day::Monday, 8, 10),
            &Venue::new("R1", 40),
            DeliveryMode::Physical,
        );
        let b = SessionAssignment::new(
            &spec("U2", "L1"),
            TimeInterval::hours(Day::Monday, 9, 11),
            &Venue::new("R2", 40),
            DeliveryMode::Physical,
        );
        assert_eq!(a.conflicts_with(&b), vec![ResourceKey::lecturer("L1")]);

        let c = SessionAssignment::new(
            &spec("U3", "L1"),
            TimeInterval::hours(Day::Monday, 10, 12),
            &Venue::new("R1", 40),
            DeliveryMode::Physical,
        );
        assert!(a.conflicts_with(&c).is_empty());
    }

    #[test]
    fn test_remote_venue_never_conflicts() {
        let a = SessionAssignment::new(
            &spec("U1", "L1"),
            TimeInterval::hours(Day::Monday, 8, 10),
            &Venue::remote(),
            DeliveryMode::Online,
        );
        let b = SessionAssignment::new(
            &spec("U2", "L2"),
            TimeInterval::hours(Day::Monday, 8, 10),
            &Venue::remote(),
            DeliveryMode::Online,
        );
        assert!(detect_conflicts(&[a, b]).is_empty());
    }

    #[test]
    fn test_detect_conflicts_counts_each_resource() {
        let interval = TimeInterval::hours(Day::Tuesday, 8, 10);
        let room = Venue::new("R1", 40);
        let a = SessionAssignment::new(&spec("U1", "L1").with_group("G1"), interval, &room, DeliveryMode::Physical);
        let b = SessionAssignment::new(&spec("U2", "L1").with_group("G1"), interval, &room, DeliveryMode::Physical);
        let conflicts = detect_conflicts(&[a, b]);
        assert_eq!(conflicts.len(), 3);
    }

    #[test]
    fn test_solution_feasibility() {
        let mut s = ScheduleSolution::new(vec![Placement::new(0, 0, DeliveryMode::Physical)]);
        assert_eq!(s.len(), 1);
        assert!(s.is_feasible());
        s.conflicts = 2;
        assert!(!s.is_feasible());
        assert!(ScheduleSolution::new(Vec::new()).is_empty());
    }
}
