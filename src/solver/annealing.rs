//! Simulated annealing.
//!
//! # Algorithm
//!
//! 1. Start from the seed solution, or a random one.
//! 2. Each iteration mutates one session of the current solution.
//! 3. Accept when the score improves, else with probability `exp(ΔE / T)`.
//! 4. Multiply `T` by the cooling rate. Stop when `T < min_temperature`
//!    or after `max_iterations`.
//!
//! The best-ever solution is tracked apart from the current one and is
//! what gets returned.
//!
//! # Reference
//! Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

use std::time::Instant;

use rand::Rng;
use tracing::{info, instrument};

use crate::config::{AnnealingConfig, EvaluationConfig};
use crate::models::ScheduleSolution;

use super::evaluate::evaluate;
use super::neighborhood::{mutate, random_solution};
use super::{improvement_pct, SearchSpace, SolveReport, SolverKind};

/// Simulated annealing over complete schedules.
#[derive(Debug, Clone, Default)]
pub struct AnnealingSolver {
    config: AnnealingConfig,
    evaluation: EvaluationConfig,
}

impl AnnealingSolver {
    /// Creates a solver with the given cooling schedule and score.
    pub fn new(config: AnnealingConfig, evaluation: EvaluationConfig) -> Self {
        Self { config, evaluation }
    }

    /// Runs the search.
    #[instrument(skip_all, fields(sessions = space.len()))]
    pub fn solve<R: Rng>(
        &self,
        space: &SearchSpace,
        seed: Option<ScheduleSolution>,
        rng: &mut R,
    ) -> SolveReport {
        let started = Instant::now();
        let cfg = &self.config;

        let mut current = seed.unwrap_or_else(|| random_solution(space, rng));
        evaluate(space, &self.evaluation, &mut current);
        let initial_conflicts = current.conflicts;
        let mut best = current.clone();

        info!(
            initial_conflicts,
            temperature = cfg.initial_temperature,
            "simulated annealing started"
        );

        let mut temperature = cfg.initial_temperature;
        let mut iterations = 0usize;
        while temperature >= cfg.min_temperature && iterations < cfg.max_iterations {
            let mut neighbour = current.clone();
            mutate(space, &mut neighbour.placements, rng);
            evaluate(space, &self.evaluation, &mut neighbour);

            let delta = neighbour.score - current.score;
            if delta > 0.0 || rng.random::<f64>() < (delta / temperature).exp() {
                current = neighbour;
                if current.score > best.score {
                    best = current.clone();
                }
            }

            temperature *= cfg.cooling_rate;
            iterations += 1;
        }

        let report = SolveReport {
            algorithm: SolverKind::Annealing,
            assignments: space.to_assignments(&best.placements),
            iterations: iterations as u64,
            initial_conflicts,
            final_conflicts: best.conflicts,
            improvement_pct: improvement_pct(initial_conflicts, best.conflicts),
            elapsed: started.elapsed(),
            best_score: best.score,
            fitness_history: Vec::new(),
            solution: best,
        };
        info!(
            iterations = report.iterations,
            final_conflicts = report.final_conflicts,
            improvement_pct = report.improvement_pct,
            "simulated annealing finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{detect_conflicts, DeliveryMode, Placement, SessionSpec};
    use crate::solver::tests::{independent_sessions, rooms, week_slots};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_conflict_free_instance() {
        let space = SearchSpace::new(independent_sessions(1), week_slots(), &rooms(1), Vec::new()).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let report = AnnealingSolver::default().solve(&space, None, &mut rng);
        assert_eq!(report.initial_conflicts, 0);
        assert_eq!(report.final_conflicts, 0);
        assert_eq!(report.improvement_pct, 0.0);
        assert_eq!(report.best_score, 1000.0);
        assert_eq!(report.algorithm, SolverKind::Annealing);
    }

    #[test]
    fn test_stops_when_cold() {
        let space = SearchSpace::new(independent_sessions(2), week_slots(), &rooms(2), Vec::new()).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let report = AnnealingSolver::default().solve(&space, None, &mut rng);
        // 100 * 0.95^k < 0.1 first holds at k = 135.
        assert_eq!(report.iterations, 135);
    }

    #[test]
    fn test_iteration_cap() {
        let space = SearchSpace::new(independent_sessions(2), week_slots(), &rooms(2), Vec::new()).unwrap();
        let solver = AnnealingSolver::new(
            AnnealingConfig::default().with_max_iterations(10),
            EvaluationConfig::default(),
        );
        let mut rng = SmallRng::seed_from_u64(42);
        assert_eq!(solver.solve(&space, None, &mut rng).iterations, 10);
    }

    #[test]
    fn test_resolves_seeded_clash() {
        // Four sessions of one lecturer, all seeded into the same slot.
        let sessions: Vec<SessionSpec> = (0..4)
            .map(|i| SessionSpec::simple(format!("U{i}"), format!("C{i}"), "L1", 2, DeliveryMode::Physical))
            .collect();
        let space = SearchSpace::new(sessions, week_slots(), &rooms(4), Vec::new()).unwrap();
        let seed = ScheduleSolution::new(
            (0..4)
                .map(|i| Placement::new(0, i, DeliveryMode::Physical))
                .collect(),
        );
        let solver = AnnealingSolver::new(
            AnnealingConfig::default()
                .with_cooling_rate(0.999)
                .with_max_iterations(5000),
            EvaluationConfig::default(),
        );
        let mut rng = SmallRng::seed_from_u64(42);
        let report = solver.solve(&space, Some(seed), &mut rng);

        assert_eq!(report.initial_conflicts, 6);
        assert!(report.final_conflicts < report.initial_conflicts);
        assert!(report.improvement_pct > 0.0);
        assert_eq!(detect_conflicts(&report.assignments).len(), report.final_conflicts);
    }
}
