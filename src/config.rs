//! Engine configuration.
//!
//! Every tuning constant (soft-constraint weights, cooling schedule,
//! population size, search budgets) lives in an immutable
//! [`SchedulerConfig`] that is passed into the assigner and each solver.
//! Defaults reproduce the standard timetabling constants; partial
//! documents deserialize over the defaults via `#[serde(default)]`.
//!
//! # Example
//! ```
//! use u_timetable::config::{AnnealingConfig, SchedulerConfig};
//!
//! let config = SchedulerConfig::default()
//!     .with_annealing(AnnealingConfig::default().with_max_iterations(200));
//! assert_eq!(config.annealing.max_iterations, 200);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::decompose::DecompositionPolicy;
use crate::error::{Result, SchedulingError};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Credit-hour decomposition policy.
    pub decomposition: DecompositionPolicy,
    /// Soft-constraint caps and scorer weights.
    pub soft: SoftConstraintConfig,
    /// Whole-schedule score shared by all solvers.
    pub evaluation: EvaluationConfig,
    /// Simulated annealing schedule.
    pub annealing: AnnealingConfig,
    /// Genetic algorithm parameters.
    pub genetic: GeneticConfig,
    /// Backtracking search budget.
    pub backtracking: BacktrackingConfig,
}

impl SchedulerConfig {
    /// Sets the decomposition policy.
    pub fn with_decomposition(mut self, policy: DecompositionPolicy) -> Self {
        self.decomposition = policy;
        self
    }

    /// Sets the soft-constraint configuration.
    pub fn with_soft(mut self, soft: SoftConstraintConfig) -> Self {
        self.soft = soft;
        self
    }

    /// Sets the annealing configuration.
    pub fn with_annealing(mut self, annealing: AnnealingConfig) -> Self {
        self.annealing = annealing;
        self
    }

    /// Sets the genetic algorithm configuration.
    pub fn with_genetic(mut self, genetic: GeneticConfig) -> Self {
        self.genetic = genetic;
        self
    }

    /// Sets the backtracking configuration.
    pub fn with_backtracking(mut self, backtracking: BacktrackingConfig) -> Self {
        self.backtracking = backtracking;
        self
    }

    /// Checks that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SchedulingError::InvalidConfig(msg));

        let s = &self.soft;
        if s.min_hours_per_day < 0.0 || s.max_hours_per_day < s.min_hours_per_day {
            return invalid(format!(
                "daily hours range [{}, {}] is empty",
                s.min_hours_per_day, s.max_hours_per_day
            ));
        }

        let a = &self.annealing;
        if !(a.cooling_rate > 0.0 && a.cooling_rate < 1.0) {
            return invalid(format!("cooling_rate {} must be in (0, 1)", a.cooling_rate));
        }
        if a.initial_temperature <= a.min_temperature || a.min_temperature <= 0.0 {
            return invalid(format!(
                "temperature range ({}, {}] is empty",
                a.min_temperature, a.initial_temperature
            ));
        }

        let g = &self.genetic;
        if g.population_size < 2 {
            return invalid(format!("population_size {} must be >= 2", g.population_size));
        }
        if g.tournament_size == 0 {
            return invalid("tournament_size must be >= 1".to_string());
        }
        for (name, p) in [("crossover_rate", g.crossover_rate), ("mutation_rate", g.mutation_rate)] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{name} {p} must be in [0, 1]"));
            }
        }

        if self.backtracking.max_nodes == 0 {
            return invalid("backtracking max_nodes must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Per-(group, day) caps and scorer weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftConstraintConfig {
    /// Max physical sessions per group per day.
    pub max_physical_per_day: u32,
    /// Max online sessions per group per day.
    pub max_online_per_day: u32,
    /// Hours per day a group should reach.
    pub min_hours_per_day: f64,
    /// Hours per day a group should not exceed.
    pub max_hours_per_day: f64,
    /// Whether mixing physical and online on a day is rewarded.
    pub require_mode_mix: bool,
    /// Whether back-to-back sessions of one group are penalized.
    pub forbid_adjacent: bool,

    /// Starting score of every candidate.
    pub base_score: f64,
    /// Penalty for violating a hard constraint.
    pub hard_violation_penalty: f64,
    /// Penalty for exceeding a daily physical/online cap.
    pub cap_penalty: f64,
    /// Penalty per hour above `max_hours_per_day`.
    pub excess_hour_penalty: f64,
    /// Bonus when the day reaches `min_hours_per_day`.
    pub min_hours_bonus: f64,
    /// Bonus for mixing modes on a day.
    pub mode_mix_bonus: f64,
    /// Bonus for using a day the group has not used yet.
    pub day_spread_bonus: f64,
    /// Penalty for an adjacent same-group session.
    pub adjacency_penalty: f64,
    /// Maximum time-of-day preference bonus.
    pub time_preference_max: f64,
    /// Fixed venue-sub-search score of a remote venue.
    pub remote_venue_bonus: f64,
}

impl Default for SoftConstraintConfig {
    fn default() -> Self {
        Self {
            max_physical_per_day: 2,
            max_online_per_day: 2,
            min_hours_per_day: 2.0,
            max_hours_per_day: 6.0,
            require_mode_mix: true,
            forbid_adjacent: true,
            base_score: 100.0,
            hard_violation_penalty: 1000.0,
            cap_penalty: 500.0,
            excess_hour_penalty: 15.0,
            min_hours_bonus: 10.0,
            mode_mix_bonus: 15.0,
            day_spread_bonus: 5.0,
            adjacency_penalty: 30.0,
            time_preference_max: 5.0,
            remote_venue_bonus: 50.0,
        }
    }
}

impl SoftConstraintConfig {
    /// Sets the daily physical and online caps.
    pub fn with_daily_caps(mut self, physical: u32, online: u32) -> Self {
        self.max_physical_per_day = physical;
        self.max_online_per_day = online;
        self
    }

    /// Sets the daily hours range.
    pub fn with_daily_hours(mut self, min: f64, max: f64) -> Self {
        self.min_hours_per_day = min;
        self.max_hours_per_day = max;
        self
    }

    /// Enables or disables the non-adjacency preference.
    pub fn with_forbid_adjacent(mut self, forbid: bool) -> Self {
        self.forbid_adjacent = forbid;
        self
    }

    /// Enables or disables the mode-mixing preference.
    pub fn with_mode_mix(mut self, required: bool) -> Self {
        self.require_mode_mix = required;
        self
    }
}

/// Whole-schedule score: `base − conflict_weight × conflicts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Score of a conflict-free schedule.
    pub base_score: f64,
    /// Score lost per pairwise conflict.
    pub conflict_weight: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            base_score: 1000.0,
            conflict_weight: 10.0,
        }
    }
}

/// Simulated annealing cooling schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    /// Starting temperature.
    pub initial_temperature: f64,
    /// Geometric cooling factor per iteration.
    pub cooling_rate: f64,
    /// Stop once the temperature falls below this.
    pub min_temperature: f64,
    /// Hard iteration cap.
    pub max_iterations: usize,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.95,
            min_temperature: 0.1,
            max_iterations: 1000,
        }
    }
}

impl AnnealingConfig {
    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the cooling factor.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    /// Sets the starting temperature.
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }
}

/// Genetic algorithm parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Number of generations.
    pub generations: usize,
    /// Random draws per tournament.
    pub tournament_size: usize,
    /// Probability of uniform crossover.
    pub crossover_rate: f64,
    /// Probability of mutating an offspring.
    pub mutation_rate: f64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            tournament_size: 3,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
        }
    }
}

impl GeneticConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation count.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the crossover and mutation rates.
    pub fn with_rates(mut self, crossover: f64, mutation: f64) -> Self {
        self.crossover_rate = crossover;
        self.mutation_rate = mutation;
        self
    }
}

/// Backtracking search budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktrackingConfig {
    /// Maximum candidate placements tried before giving up.
    pub max_nodes: u64,
}

impl Default for BacktrackingConfig {
    fn default() -> Self {
        Self { max_nodes: 1_000_000 }
    }
}

impl BacktrackingConfig {
    /// Sets the node budget.
    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = max_nodes;
        self
    }
}
