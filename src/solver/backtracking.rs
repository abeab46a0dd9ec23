//! Exhaustive backtracking.
//!
//! Depth-first over sessions in input order. At each depth every
//! (mode × slot × venue) of the session's domain is tried, requested mode
//! first. A choice is kept only if it adds no conflict against the
//! shallower choices and the pinned bookings. The first complete
//! conflict-free assignment wins.
//!
//! Every tried choice counts as one node. Exceeding `max_nodes` stops the
//! search with `budget_exhausted = true`.

use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::config::{BacktrackingConfig, EvaluationConfig};
use crate::error::{Result, SchedulingError};
use crate::models::{DeliveryMode, Placement, ScheduleSolution, SessionAssignment};

use super::evaluate::{conflicts_with_fixed, score};
use super::{SearchSpace, SolveReport, SolverKind};

/// Outcome of one subtree.
enum Search {
    Found,
    Exhausted,
    OutOfBudget,
}

struct Frame<'s> {
    space: &'s SearchSpace,
    max_nodes: u64,
    nodes: u64,
    placements: Vec<Placement>,
    fixed: Vec<SessionAssignment>,
}

impl Frame<'_> {
    fn descend(&mut self, depth: usize) -> Search {
        let space = self.space;
        if depth == space.len() {
            return Search::Found;
        }
        let domain = space.domain(depth);
        let requested = space.sessions()[depth].mode;

        for mode in mode_order(requested) {
            for &slot in &domain.slots {
                for &venue in domain.venues_for(mode) {
                    if self.nodes >= self.max_nodes {
                        return Search::OutOfBudget;
                    }
                    self.nodes += 1;

                    let placement = Placement::new(slot, venue, mode);
                    if conflicts_with_fixed(space, depth, placement, &self.fixed) > 0 {
                        continue;
                    }
                    self.placements.push(placement);
                    self.fixed.push(space.assignment(depth, placement));
                    match self.descend(depth + 1) {
                        Search::Found => return Search::Found,
                        Search::OutOfBudget => return Search::OutOfBudget,
                        Search::Exhausted => {
                            self.placements.pop();
                            self.fixed.pop();
                        }
                    }
                }
            }
        }
        Search::Exhausted
    }
}

/// First-feasible depth-first search.
#[derive(Debug, Clone, Default)]
pub struct BacktrackingSolver {
    config: BacktrackingConfig,
    evaluation: EvaluationConfig,
}

impl BacktrackingSolver {
    /// Creates a solver with the given node budget and score.
    pub fn new(config: BacktrackingConfig, evaluation: EvaluationConfig) -> Self {
        Self { config, evaluation }
    }

    /// Runs the search.
    ///
    /// Fails with [`SchedulingError::NoSolutionFound`] when the tree is
    /// exhausted or the node budget runs out.
    #[instrument(skip_all, fields(sessions = space.len(), max_nodes = self.config.max_nodes))]
    pub fn solve(&self, space: &SearchSpace) -> Result<SolveReport> {
        let started = Instant::now();
        info!("backtracking started");

        let mut frame = Frame {
            space,
            max_nodes: self.config.max_nodes,
            nodes: 0,
            placements: Vec::with_capacity(space.len()),
            fixed: Vec::with_capacity(space.len()),
        };

        match frame.descend(0) {
            Search::Found => {
                let mut solution = ScheduleSolution::new(frame.placements);
                solution.conflicts = 0;
                solution.score = score(&self.evaluation, 0);
                info!(explored_nodes = frame.nodes, "backtracking found a schedule");
                Ok(SolveReport {
                    algorithm: SolverKind::Backtracking,
                    assignments: frame.fixed,
                    iterations: frame.nodes,
                    initial_conflicts: 0,
                    final_conflicts: 0,
                    improvement_pct: 0.0,
                    elapsed: started.elapsed(),
                    best_score: solution.score,
                    fitness_history: Vec::new(),
                    solution,
                })
            }
            outcome => {
                let budget_exhausted = matches!(outcome, Search::OutOfBudget);
                warn!(explored_nodes = frame.nodes, budget_exhausted, "backtracking found no schedule");
                Err(SchedulingError::NoSolutionFound {
                    explored_nodes: frame.nodes,
                    budget_exhausted,
                })
            }
        }
    }
}

/// Modes tried for a session, requested first.
pub fn mode_order(requested: DeliveryMode) -> [DeliveryMode; 2] {
    [requested, requested.flipped()]
}
