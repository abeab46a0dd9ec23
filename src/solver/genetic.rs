//! Genetic algorithm.
//!
//! # Encoding
//! One gene per session: its [`Placement`]. Genes are independent, so
//! uniform crossover always yields a valid child.
//!
//! # Generation step
//! For each of `population_size` children:
//! 1. Two tournament selections pick the parents.
//! 2. With `crossover_rate`, uniform crossover (per-gene coin flip);
//!    otherwise the child is a copy of the first parent.
//! 3. With `mutation_rate`, one single-session mutation.
//!
//! Fitness is the shared whole-schedule score (higher = better). The
//! best-ever fitness is recorded after every generation, so the history
//! never decreases.
//!
//! # Reference
//! Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, instrument};

use crate::config::{EvaluationConfig, GeneticConfig};
use crate::models::{Placement, ScheduleSolution};

use super::evaluate::evaluate;
use super::neighborhood::{mutate, random_solution};
use super::{improvement_pct, SearchSpace, SolveReport, SolverKind};

/// Index of the fittest of `size` uniformly drawn individuals.
///
/// `population` must not be empty.
pub fn tournament_select<R: Rng>(population: &[ScheduleSolution], size: usize, rng: &mut R) -> usize {
    let mut best = rng.random_range(0..population.len());
    for _ in 1..size {
        let challenger = rng.random_range(0..population.len());
        if population[challenger].score > population[best].score {
            best = challenger;
        }
    }
    best
}

/// Per-gene coin flip between two parents.
pub fn uniform_crossover<R: Rng>(p1: &[Placement], p2: &[Placement], rng: &mut R) -> Vec<Placement> {
    p1.iter()
        .zip(p2)
        .map(|(&a, &b)| if rng.random_bool(0.5) { a } else { b })
        .collect()
}

/// Generational GA over complete schedules.
#[derive(Debug, Clone, Default)]
pub struct GeneticSolver {
    config: GeneticConfig,
    evaluation: EvaluationConfig,
}

impl GeneticSolver {
    /// Creates a solver with the given parameters and score.
    pub fn new(config: GeneticConfig, evaluation: EvaluationConfig) -> Self {
        Self { config, evaluation }
    }

    fn fittest(population: &[ScheduleSolution]) -> Option<&ScheduleSolution> {
        population.iter().max_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// Runs the search.
    ///
    /// `seed`, when given, replaces the first random individual.
    #[instrument(skip_all, fields(sessions = space.len()))]
    pub fn solve<R: Rng>(
        &self,
        space: &SearchSpace,
        seed: Option<ScheduleSolution>,
        rng: &mut R,
    ) -> SolveReport {
        let started = Instant::now();
        let cfg = &self.config;
        let pop_size = cfg.population_size.max(1);

        let mut population: Vec<ScheduleSolution> =
            (0..pop_size).map(|_| random_solution(space, rng)).collect();
        if let Some(seed) = seed {
            population[0] = seed;
        }
        for individual in &mut population {
            evaluate(space, &self.evaluation, individual);
        }

        // The seed (or first individual) is the reference point for improvement.
        let initial_conflicts = population[0].conflicts;
        let mut best = match Self::fittest(&population) {
            Some(b) => b.clone(),
            None => population[0].clone(),
        };
        info!(
            population = pop_size,
            generations = cfg.generations,
            initial_conflicts,
            "genetic algorithm started"
        );

        let mut history = Vec::with_capacity(cfg.generations);
        for generation in 0..cfg.generations {
            let mut next = Vec::with_capacity(pop_size);
            for _ in 0..pop_size {
                let p1 = tournament_select(&population, cfg.tournament_size, rng);
                let p2 = tournament_select(&population, cfg.tournament_size, rng);

                let placements = if rng.random_bool(cfg.crossover_rate) {
                    uniform_crossover(&population[p1].placements, &population[p2].placements, rng)
                } else {
                    population[p1].placements.clone()
                };
                let mut child = ScheduleSolution::new(placements);
                if rng.random_bool(cfg.mutation_rate) {
                    mutate(space, &mut child.placements, rng);
                }
                evaluate(space, &self.evaluation, &mut child);
                next.push(child);
            }
            population = next;

            if let Some(champion) = Self::fittest(&population) {
                if champion.score > best.score {
                    best = champion.clone();
                    debug!(generation, conflicts = best.conflicts, "new best-ever solution");
                }
            }
            history.push(best.score);
        }

        let report = SolveReport {
            algorithm: SolverKind::Genetic,
            assignments: space.to_assignments(&best.placements),
            iterations: cfg.generations as u64,
            initial_conflicts,
            final_conflicts: best.conflicts,
            improvement_pct: improvement_pct(initial_conflicts, best.conflicts),
            elapsed: started.elapsed(),
            best_score: best.score,
            fitness_history: history,
            solution: best,
        };
        info!(
            generations = report.iterations,
            final_conflicts = report.final_conflicts,
            best_score = report.best_score,
            "genetic algorithm finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{detect_conflicts, DeliveryMode, SessionSpec};
    use crate::solver::tests::{independent_sessions, rooms, week_slots};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn clashing_space() -> SearchSpace {
        // Six sessions share a lecturer and must spread over ten slots.
        let sessions: Vec<SessionSpec> = (0..6)
            .map(|i| {
                SessionSpec::simple(format!("U{i}"), format!("C{i}"), "L1", 2, DeliveryMode::Physical)
                    .with_group("G1")
            })
            .collect();
        SearchSpace::new(sessions, week_slots(), &rooms(2), Vec::new()).unwrap()
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut pop: Vec<ScheduleSolution> = (0..5).map(|_| ScheduleSolution::new(Vec::new())).collect();
        for (i, s) in pop.iter_mut().enumerate() {
            s.score = i as f64;
        }
        let mut rng = SmallRng::seed_from_u64(42);
        // A tournament as large as the population almost always finds the best.
        let wins = (0..200)
            .filter(|_| tournament_select(&pop, 50, &mut rng) == 4)
            .count();
        assert!(wins > 190);
        // Size 1 is a uniform draw.
        let idx = tournament_select(&pop, 1, &mut rng);
        assert!(idx < 5);
    }

    #[test]
    fn test_uniform_crossover_takes_genes_from_parents() {
        let p1: Vec<Placement> = (0..20).map(|i| Placement::new(i, 0, DeliveryMode::Physical)).collect();
        let p2: Vec<Placement> = (0..20).map(|i| Placement::new(i, 1, DeliveryMode::Online)).collect();
        let mut rng = SmallRng::seed_from_u64(9);
        let child = uniform_crossover(&p1, &p2, &mut rng);
        assert_eq!(child.len(), 20);
        for (i, g) in child.iter().enumerate() {
            assert!(*g == p1[i] || *g == p2[i]);
        }
        assert!(child.iter().any(|g| g.venue == 0));
        assert!(child.iter().any(|g| g.venue == 1));
    }

    #[test]
    fn test_history_monotone() {
        let space = clashing_space();
        let solver = GeneticSolver::new(
            GeneticConfig::default().with_population_size(20).with_generations(40),
            EvaluationConfig::default(),
        );
        let mut rng = SmallRng::seed_from_u64(42);
        let report = solver.solve(&space, None, &mut rng);

        assert_eq!(report.fitness_history.len(), 40);
        assert!(report.fitness_history.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(report.fitness_history.last().copied(), Some(report.best_score));
        assert_eq!(report.iterations, 40);
        assert_eq!(report.algorithm, SolverKind::Genetic);
    }

    #[test]
    fn test_improves_over_clashing_seed() {
        let space = clashing_space();
        let seed = ScheduleSolution::new((0..6).map(|i| Placement::new(0, i % 2, DeliveryMode::Physical)).collect());
        let mut rng = SmallRng::seed_from_u64(7);
        let report = GeneticSolver::default().solve(&space, Some(seed), &mut rng);

        assert!(report.initial_conflicts > 0);
        assert!(report.final_conflicts < report.initial_conflicts);
        assert_eq!(detect_conflicts(&report.assignments).len(), report.final_conflicts);
    }

    #[test]
    fn test_conflict_free_instance_stays_clean() {
        // Online sessions with distinct lecturers and groups never clash
        // until a mutation moves one into a room.
        let sessions: Vec<SessionSpec> = independent_sessions(3)
            .into_iter()
            .map(|mut s| {
                s.mode = DeliveryMode::Online;
                s
            })
            .collect();
        let space = SearchSpace::new(sessions, week_slots(), &rooms(3), Vec::new()).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let solver = GeneticSolver::new(
            GeneticConfig::default().with_population_size(10).with_generations(10),
            EvaluationConfig::default(),
        );
        let report = solver.solve(&space, None, &mut rng);
        assert_eq!(report.final_conflicts, 0);
        assert!(report.fitness_history.iter().all(|&f| f == 1000.0));
    }
}
