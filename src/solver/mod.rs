//! Whole-schedule solvers.
//!
//! Three interchangeable strategies over one constraint model:
//!
//! | Solver | Strategy | Guarantees |
//! |--------|----------|------------|
//! | [`AnnealingSolver`] | single-state local search, geometric cooling | best-ever within budget |
//! | [`GeneticSolver`] | tournament selection, uniform crossover | monotone best-ever history |
//! | [`BacktrackingSolver`] | depth-first, first feasible | complete within node budget |
//!
//! All of them share [`SearchSpace`] (session domains and pinned
//! bookings), [`evaluate`] (conflict count and score) and
//! [`neighborhood`] (random placement and single-session mutation).

pub mod annealing;
pub mod backtracking;
pub mod evaluate;
pub mod genetic;
pub mod neighborhood;

pub use annealing::AnnealingSolver;
pub use backtracking::BacktrackingSolver;
pub use genetic::GeneticSolver;

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulingError};
use crate::models::{
    DeliveryMode, Placement, ScheduleSolution, SessionAssignment, SessionRef, SessionSpec,
    TimeSlot, Venue,
};
use crate::validation::{ValidationError, ValidationErrorKind, ValidationResult};

/// Which whole-schedule strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverKind {
    /// Simulated annealing.
    Annealing,
    /// Genetic algorithm.
    Genetic,
    /// Exhaustive depth-first search.
    Backtracking,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverKind::Annealing => f.write_str("simulated_annealing"),
            SolverKind::Genetic => f.write_str("genetic_algorithm"),
            SolverKind::Backtracking => f.write_str("backtracking"),
        }
    }
}

/// Admissible placements of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDomain {
    /// Slot indices whose duration matches the session.
    pub slots: Vec<usize>,
    /// Venue indices usable for physical delivery (capacity fits).
    pub physical_venues: Vec<usize>,
    /// Venue indices usable for online delivery.
    pub remote_venues: Vec<usize>,
}

impl SessionDomain {
    /// Venues usable in `mode`.
    pub fn venues_for(&self, mode: DeliveryMode) -> &[usize] {
        match mode {
            DeliveryMode::Physical => &self.physical_venues,
            DeliveryMode::Online => &self.remote_venues,
        }
    }

    /// Whether `mode` has at least one usable venue.
    pub fn allows(&self, mode: DeliveryMode) -> bool {
        !self.venues_for(mode).is_empty()
    }

    /// Number of (slot, venue, mode) combinations.
    pub fn size(&self) -> usize {
        self.slots.len() * (self.physical_venues.len() + self.remote_venues.len())
    }
}

/// The fixed part of a whole-schedule problem.
///
/// Venues are the catalog plus the remote sentinel when the catalog has
/// no remote venue. Pinned bookings count for conflicts but never move.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    sessions: Vec<SessionSpec>,
    slots: Vec<TimeSlot>,
    venues: Vec<Venue>,
    domains: Vec<SessionDomain>,
    pinned: Vec<SessionAssignment>,
}

impl SearchSpace {
    /// Builds the search space.
    ///
    /// Fails with [`SchedulingError::InputDataMissing`] when there is
    /// nothing to place, a catalog is empty, or a session has no slot of
    /// its duration or no usable venue.
    pub fn new(
        sessions: Vec<SessionSpec>,
        slots: Vec<TimeSlot>,
        venues: &[Venue],
        pinned: Vec<SessionAssignment>,
    ) -> Result<Self> {
        if sessions.is_empty() {
            return Err(SchedulingError::InputDataMissing("no sessions to schedule".into()));
        }
        if slots.is_empty() {
            return Err(SchedulingError::InputDataMissing("time slot catalog is empty".into()));
        }
        if venues.is_empty() {
            return Err(SchedulingError::InputDataMissing("venue catalog is empty".into()));
        }

        let mut all_venues = venues.to_vec();
        if !all_venues.iter().any(|v| v.is_remote) {
            all_venues.push(Venue::remote());
        }

        let mut domains = Vec::with_capacity(sessions.len());
        for spec in &sessions {
            let slot_ids: Vec<usize> = slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.duration_min() == spec.required_duration_min)
                .map(|(i, _)| i)
                .collect();
            if slot_ids.is_empty() {
                return Err(SchedulingError::InputDataMissing(format!(
                    "no {}-minute time slot for session {}",
                    spec.required_duration_min, spec.session_ref
                )));
            }
            let physical: Vec<usize> = all_venues
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_remote && v.fits(spec.student_count))
                .map(|(i, _)| i)
                .collect();
            let remote: Vec<usize> = all_venues
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_remote)
                .map(|(i, _)| i)
                .collect();
            domains.push(SessionDomain {
                slots: slot_ids,
                physical_venues: physical,
                remote_venues: remote,
            });
        }

        // Sessions being solved are never pinned against themselves.
        let solving: Vec<&SessionRef> = sessions.iter().map(|s| &s.session_ref).collect();
        let pinned = pinned
            .into_iter()
            .filter(|a| !solving.contains(&&a.session_ref))
            .collect();

        Ok(Self {
            sessions,
            slots,
            venues: all_venues,
            domains,
            pinned,
        })
    }

    /// Sessions, in solution order.
    pub fn sessions(&self) -> &[SessionSpec] {
        &self.sessions
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Slot catalog.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Venue list (catalog plus sentinel).
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// Domain of session `i`.
    pub fn domain(&self, i: usize) -> &SessionDomain {
        &self.domains[i]
    }

    /// Committed bookings outside the problem.
    pub fn pinned(&self) -> &[SessionAssignment] {
        &self.pinned
    }

    /// Concrete assignment for session `i` at `placement`.
    pub fn assignment(&self, i: usize, placement: Placement) -> SessionAssignment {
        SessionAssignment::new(
            &self.sessions[i],
            self.slots[placement.slot].interval(),
            &self.venues[placement.venue],
            placement.mode,
        )
    }

    /// Concrete assignments for a full set of placements.
    pub fn to_assignments(&self, placements: &[Placement]) -> Vec<SessionAssignment> {
        placements
            .iter()
            .enumerate()
            .map(|(i, &p)| self.assignment(i, p))
            .collect()
    }

    /// Maps an existing assignment back to a placement of session `i`.
    ///
    /// Returns `None` when its interval is not a catalog slot of the right
    /// length or its venue is not usable in its mode.
    pub fn placement_of(&self, i: usize, assignment: &SessionAssignment) -> Option<Placement> {
        let domain = &self.domains[i];
        let slot = domain
            .slots
            .iter()
            .copied()
            .find(|&s| self.slots[s].interval() == assignment.interval)?;
        let venue = domain
            .venues_for(assignment.mode)
            .iter()
            .copied()
            .find(|&v| self.venues[v].name == assignment.venue)?;
        Some(Placement::new(slot, venue, assignment.mode))
    }

    /// Checks that `solution` has one placement per session and that each
    /// lies in its session's domain.
    pub fn check_solution(&self, solution: &ScheduleSolution) -> ValidationResult {
        if solution.len() != self.len() {
            return Err(vec![ValidationError::new(
                ValidationErrorKind::OutOfDomain,
                format!("solution has {} placement(s) for {} session(s)", solution.len(), self.len()),
            )]);
        }
        let errors: Vec<ValidationError> = solution
            .placements
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                let domain = &self.domains[*i];
                !domain.slots.contains(&p.slot) || !domain.venues_for(p.mode).contains(&p.venue)
            })
            .map(|(i, p)| {
                ValidationError::new(
                    ValidationErrorKind::OutOfDomain,
                    format!(
                        "placement (slot {}, venue {}, {}) is not allowed for session {}",
                        p.slot, p.venue, p.mode, self.sessions[i].session_ref
                    ),
                )
            })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Builds a starting solution from the current schedule.
    ///
    /// Sessions absent from `existing` (or not representable) get a
    /// random placement.
    pub fn seed_solution<R: Rng>(&self, existing: &[SessionAssignment], rng: &mut R) -> ScheduleSolution {
        let by_ref: HashMap<&SessionRef, &SessionAssignment> =
            existing.iter().map(|a| (&a.session_ref, a)).collect();
        let placements = (0..self.len())
            .map(|i| {
                by_ref
                    .get(&self.sessions[i].session_ref)
                    .and_then(|a| self.placement_of(i, a))
                    .unwrap_or_else(|| neighborhood::random_placement(self, i, rng))
            })
            .collect();
        ScheduleSolution::new(placements)
    }
}

/// Diagnostics and result of one solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// Strategy that produced the solution.
    pub algorithm: SolverKind,
    /// Best solution found.
    pub solution: ScheduleSolution,
    /// The solution as concrete assignments.
    pub assignments: Vec<SessionAssignment>,
    /// Iterations (SA), generations (GA) or explored nodes (backtracking).
    pub iterations: u64,
    /// Conflicts of the starting solution.
    pub initial_conflicts: usize,
    /// Conflicts of the returned solution.
    pub final_conflicts: usize,
    /// `(initial - final) / initial * 100`, 0 when `initial` is 0.
    pub improvement_pct: f64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Score of the returned solution.
    pub best_score: f64,
    /// Best-ever score per generation (GA only).
    pub fitness_history: Vec<f64>,
}

impl SolveReport {
    /// Whether the solution is conflict-free.
    pub fn is_feasible(&self) -> bool {
        self.final_conflicts == 0
    }
}

/// Relative conflict reduction in percent.
pub fn improvement_pct(initial: usize, fin: usize) -> f64 {
    if initial == 0 {
        0.0
    } else {
        (initial as f64 - fin as f64) / initial as f64 * 100.0
    }
}

/// Runs the chosen strategy over `space`.
///
/// `seed` is the starting point for annealing and one member of the
/// initial GA population; backtracking ignores it. A seed that does not
/// fit `space` is [`SchedulingError::InvalidInput`].
pub fn solve<R: Rng>(
    kind: SolverKind,
    space: &SearchSpace,
    config: &SchedulerConfig,
    seed: Option<ScheduleSolution>,
    rng: &mut R,
) -> Result<SolveReport> {
    config.validate()?;
    if let Some(seed) = &seed {
        space.check_solution(seed).map_err(SchedulingError::InvalidInput)?;
    }
    match kind {
        SolverKind::Annealing => Ok(AnnealingSolver::new(config.annealing.clone(), config.evaluation.clone())
            .solve(space, seed, rng)),
        SolverKind::Genetic => Ok(GeneticSolver::new(config.genetic.clone(), config.evaluation.clone())
            .solve(space, seed, rng)),
        SolverKind::Backtracking => {
            BacktrackingSolver::new(config.backtracking.clone(), config.evaluation.clone()).solve(space)
        }
    }
}
