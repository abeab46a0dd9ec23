//! Soft-constraint scoring.
//!
//! Scores a candidate placement against the per-(group, day) load that is
//! already accumulated. Higher is better; a negative total means the
//! candidate breaks a cap or a hard constraint.
//!
//! # Terms
//!
//! | Term | Effect |
//! |------|--------|
//! | Hard violation (ledger re-check) | −1000, bonuses dropped |
//! | Daily physical/online cap exceeded | −500 |
//! | Hours above daily max | −excess × 15 |
//! | Daily min hours reached | +10 |
//! | Mode mixing | +15 |
//! | New day for the group | +5 |
//! | Adjacent same-group session | −30 |
//! | Time of day | up to +5 (physical early, online late) |

use std::collections::{HashMap, HashSet};

use crate::config::SoftConstraintConfig;
use crate::ledger::ResourceLedger;
use crate::models::{
    Day, DeliveryMode, ResourceKey, SessionAssignment, SessionSpec, TimeInterval, Venue,
};

/// First minute of the teaching day used by the time-of-day preference.
const TEACHING_DAY_START: u32 = 7 * 60;
/// Last minute of the teaching day used by the time-of-day preference.
const TEACHING_DAY_END: u32 = 21 * 60;

/// Accumulated sessions of one group on one day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyLoad {
    /// Physical sessions.
    pub physical_count: u32,
    /// Online sessions.
    pub online_count: u32,
    /// Total booked minutes.
    pub total_minutes: u32,
    /// Booked intervals (for adjacency).
    pub intervals: Vec<TimeInterval>,
}

impl DailyLoad {
    /// Total booked hours.
    pub fn total_hours(&self) -> f64 {
        self.total_minutes as f64 / 60.0
    }
}

/// Per-(group, day) load statistics.
///
/// Sessions without a group are tracked under their class.
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    loads: HashMap<(ResourceKey, Day), DailyLoad>,
    days_used: HashMap<ResourceKey, HashSet<Day>>,
}

impl LoadTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tracker from existing assignments.
    pub fn from_assignments<'a>(assignments: impl IntoIterator<Item = &'a SessionAssignment>) -> Self {
        let mut tracker = Self::new();
        for a in assignments {
            tracker.record(a);
        }
        tracker
    }

    /// Cohort key of an assignment: its group, or its class.
    fn cohort_of(assignment: &SessionAssignment) -> ResourceKey {
        match &assignment.session_ref.group_id {
            Some(g) => ResourceKey::Group(g.clone()),
            None => ResourceKey::Class(assignment.session_ref.class_id.clone()),
        }
    }

    /// Adds an assignment to the statistics.
    pub fn record(&mut self, assignment: &SessionAssignment) {
        let cohort = Self::cohort_of(assignment);
        let day = assignment.interval.day;
        let load = self.loads.entry((cohort.clone(), day)).or_default();
        match assignment.mode {
            DeliveryMode::Physical => load.physical_count += 1,
            DeliveryMode::Online => load.online_count += 1,
        }
        load.total_minutes += assignment.interval.duration_min();
        load.intervals.push(assignment.interval);
        self.days_used.entry(cohort).or_default().insert(day);
    }

    /// Load of `cohort` on `day` (empty if none).
    pub fn load(&self, cohort: &ResourceKey, day: Day) -> DailyLoad {
        self.loads
            .get(&(cohort.clone(), day))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `cohort` already has a session on `day`.
    pub fn has_used_day(&self, cohort: &ResourceKey, day: Day) -> bool {
        self.days_used
            .get(cohort)
            .is_some_and(|days| days.contains(&day))
    }

    /// All tracked (cohort, day) loads.
    pub fn iter(&self) -> impl Iterator<Item = (&(ResourceKey, Day), &DailyLoad)> {
        self.loads.iter()
    }
}

/// Score of one candidate, split into its parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Base score (zeroed on a hard violation).
    pub base: f64,
    /// Sum of rewards (zeroed on a hard violation).
    pub bonus: f64,
    /// Sum of soft penalties (non-negative magnitude).
    pub penalty: f64,
    /// Whether the ledger re-check found a hard conflict.
    pub hard_violation: bool,
    /// Penalty applied for the hard violation.
    pub hard_penalty: f64,
}

impl ScoreBreakdown {
    /// Final score.
    pub fn total(&self) -> f64 {
        self.base + self.bonus - self.penalty - self.hard_penalty
    }

    /// Whether no soft preference is violated.
    pub fn is_soft_compliant(&self) -> bool {
        self.penalty == 0.0
    }
}

/// Weighted soft-constraint scorer.
#[derive(Debug, Clone, Copy)]
pub struct SoftScorer<'a> {
    config: &'a SoftConstraintConfig,
}

impl<'a> SoftScorer<'a> {
    /// Creates a scorer with the given weights.
    pub fn new(config: &'a SoftConstraintConfig) -> Self {
        Self { config }
    }

    /// Soft-only score of placing `spec` at `interval` in `mode`.
    ///
    /// Ignores venues and hard constraints.
    pub fn score_slot(
        &self,
        spec: &SessionSpec,
        interval: &TimeInterval,
        mode: DeliveryMode,
        loads: &LoadTracker,
    ) -> ScoreBreakdown {
        let c = self.config;
        let cohort = spec.cohort_key();
        let load = loads.load(&cohort, interval.day);
        let mut bonus = 0.0;
        let mut penalty = 0.0;

        let over_cap = match mode {
            DeliveryMode::Physical => load.physical_count + 1 > c.max_physical_per_day,
            DeliveryMode::Online => load.online_count + 1 > c.max_online_per_day,
        };
        if over_cap {
            penalty += c.cap_penalty;
        }

        let hours_after = load.total_hours() + interval.duration_hours();
        if hours_after > c.max_hours_per_day {
            penalty += (hours_after - c.max_hours_per_day) * c.excess_hour_penalty;
        }
        if hours_after >= c.min_hours_per_day {
            bonus += c.min_hours_bonus;
        }

        if c.require_mode_mix {
            let mixes = match mode {
                DeliveryMode::Physical => load.online_count > 0,
                DeliveryMode::Online => load.physical_count > 0,
            };
            if mixes {
                bonus += c.mode_mix_bonus;
            }
        }

        if !loads.has_used_day(&cohort, interval.day) {
            bonus += c.day_spread_bonus;
        }

        if c.forbid_adjacent && load.intervals.iter().any(|i| i.is_adjacent(interval)) {
            penalty += c.adjacency_penalty;
        }

        bonus += self.time_preference(interval, mode);

        ScoreBreakdown {
            base: c.base_score,
            bonus,
            penalty,
            hard_violation: false,
            hard_penalty: 0.0,
        }
    }

    /// Full score of a candidate assignment, including the hard re-check.
    ///
    /// A candidate that overlaps a booked lecturer, venue or group always
    /// scores at most `-hard_violation_penalty`.
    pub fn score(
        &self,
        spec: &SessionSpec,
        candidate: &SessionAssignment,
        loads: &LoadTracker,
        ledger: &ResourceLedger,
    ) -> ScoreBreakdown {
        let mut breakdown = self.score_slot(spec, &candidate.interval, candidate.mode, loads);
        if !ledger.hard_conflicts(candidate).is_empty() {
            breakdown.hard_violation = true;
            breakdown.hard_penalty = self.config.hard_violation_penalty;
            breakdown.base = 0.0;
            breakdown.bonus = 0.0;
        }
        breakdown
    }

    /// Venue sub-search score: remote venues get a fixed bonus, physical
    /// venues score higher the tighter they fit.
    pub fn venue_score(&self, venue: &Venue, student_count: u32) -> f64 {
        if venue.is_remote {
            self.config.remote_venue_bonus
        } else {
            100.0 - venue.spare_capacity(student_count).min(100) as f64
        }
    }

    /// Earlier starts favour physical sessions, later starts online ones.
    fn time_preference(&self, interval: &TimeInterval, mode: DeliveryMode) -> f64 {
        let span = (TEACHING_DAY_END - TEACHING_DAY_START) as f64;
        let offset = interval
            .start_min
            .clamp(TEACHING_DAY_START, TEACHING_DAY_END)
            - TEACHING_DAY_START;
        let lateness = offset as f64 / span;
        let preference = match mode {
            DeliveryMode::Physical => 1.0 - lateness,
            DeliveryMode::Online => lateness,
        };
        preference * self.config.time_preference_max
    }
}
