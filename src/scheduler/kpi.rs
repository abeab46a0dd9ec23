//! Timetable quality metrics (KPIs).
//!
//! Computes indicators from a set of assignments and the catalogs they
//! were drawn from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Hard conflicts | Pairwise lecturer/venue/group overlaps |
//! | Sessions per day | Count of assignments by weekday |
//! | Soft violations | Per-(group, day) cap, hours and adjacency breaches |
//! | Venue utilization | Booked minutes / catalog minutes, per physical venue |
//! | Online share | Fraction of sessions delivered online |

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::SoftConstraintConfig;
use crate::models::{detect_conflicts, Day, DeliveryMode, ResourceKey, SessionAssignment, TimeSlot};
use crate::scoring::LoadTracker;

/// Which soft preference a (group, day) breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoftViolationKind {
    /// More physical sessions than the daily cap.
    PhysicalCap,
    /// More online sessions than the daily cap.
    OnlineCap,
    /// Fewer hours than the daily minimum.
    TooFewHours,
    /// More hours than the daily maximum.
    TooManyHours,
    /// Two sessions back to back.
    Adjacent,
}

/// One soft-preference breach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftViolation {
    /// Group (or class, for sessions without a group).
    pub cohort: ResourceKey,
    /// Day of the breach.
    pub day: Day,
    /// What was breached.
    pub kind: SoftViolationKind,
}

/// Timetable performance indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableKpi {
    /// Number of pairwise hard conflicts.
    pub hard_conflicts: usize,
    /// Sessions per weekday.
    pub sessions_per_day: BTreeMap<Day, usize>,
    /// Soft-preference breaches.
    pub soft_violations: Vec<SoftViolation>,
    /// Per-venue utilization (0.0..1.0); remote venues excluded.
    pub venue_utilization: HashMap<String, f64>,
    /// Mean of `venue_utilization`.
    pub avg_venue_utilization: f64,
    /// Fraction of sessions delivered online (0.0..1.0).
    pub online_share: f64,
}

impl TimetableKpi {
    /// Computes KPIs for `assignments`.
    ///
    /// # Arguments
    /// * `assignments` - The timetable to measure.
    /// * `slots` - Slot catalog; its total length is each venue's capacity.
    /// * `config` - Caps and hour bounds used for soft violations.
    pub fn calculate(
        assignments: &[SessionAssignment],
        slots: &[TimeSlot],
        config: &SoftConstraintConfig,
    ) -> Self {
        let hard_conflicts = detect_conflicts(assignments).len();

        let mut sessions_per_day = BTreeMap::new();
        for a in assignments {
            *sessions_per_day.entry(a.interval.day).or_insert(0) += 1;
        }

        let soft_violations = soft_violations(assignments, config);

        // Utilization
        let catalog_minutes: u32 = slots.iter().map(|s| s.duration_min()).sum();
        let mut booked: HashMap<String, u32> = HashMap::new();
        for a in assignments.iter().filter(|a| !a.venue_is_remote) {
            *booked.entry(a.venue.clone()).or_insert(0) += a.interval.duration_min();
        }
        let venue_utilization: HashMap<String, f64> = booked
            .into_iter()
            .map(|(venue, minutes)| {
                let u = if catalog_minutes == 0 {
                    0.0
                } else {
                    minutes as f64 / catalog_minutes as f64
                };
                (venue, u)
            })
            .collect();
        let avg_venue_utilization = if venue_utilization.is_empty() {
            0.0
        } else {
            venue_utilization.values().sum::<f64>() / venue_utilization.len() as f64
        };

        let online = assignments
            .iter()
            .filter(|a| a.mode == DeliveryMode::Online)
            .count();
        let online_share = if assignments.is_empty() {
            0.0
        } else {
            online as f64 / assignments.len() as f64
        };

        Self {
            hard_conflicts,
            sessions_per_day,
            soft_violations,
            venue_utilization,
            avg_venue_utilization,
            online_share,
        }
    }

    /// Whether the timetable is free of hard conflicts and has at most
    /// `max_soft_violations` soft breaches.
    pub fn meets_thresholds(&self, max_soft_violations: usize) -> bool {
        self.hard_conflicts == 0 && self.soft_violations.len() <= max_soft_violations
    }
}

fn soft_violations(assignments: &[SessionAssignment], config: &SoftConstraintConfig) -> Vec<SoftViolation> {
    let loads = LoadTracker::from_assignments(assignments);
    let mut violations = Vec::new();
    for ((cohort, day), load) in loads.iter() {
        let mut push = |kind| {
            violations.push(SoftViolation {
                cohort: cohort.clone(),
                day: *day,
                kind,
            })
        };
        if load.physical_count > config.max_physical_per_day {
            push(SoftViolationKind::PhysicalCap);
        }
        if load.online_count > config.max_online_per_day {
            push(SoftViolationKind::OnlineCap);
        }
        let hours = load.total_hours();
        if hours < config.min_hours_per_day {
            push(SoftViolationKind::TooFewHours);
        }
        if hours > config.max_hours_per_day {
            push(SoftViolationKind::TooManyHours);
        }
        if config.forbid_adjacent {
            let adjacent = load.intervals.iter().enumerate().any(|(i, a)| {
                load.intervals[i + 1..].iter().any(|b| a.is_adjacent(b))
            });
            if adjacent {
                push(SoftViolationKind::Adjacent);
            }
        }
    }
    // HashMap iteration order is arbitrary.
    violations.sort_by(|a, b| (a.day, &a.cohort, a.kind).cmp(&(b.day, &b.cohort, b.kind)));
    violations
}
