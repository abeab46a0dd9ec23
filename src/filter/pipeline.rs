//! Ordered hard/soft filter pipeline.
//!
//! Stages run left to right, each narrowing the candidate set:
//!
//! 1. `DurationDay` (hard): slot length equals the required duration and
//!    the day is allowed.
//! 2. `Lecturer` (hard): the lecturer is free.
//! 3. `GroupClass` (soft): the group and class are free.
//! 4. `Venue` (soft): the venue is free; remote venues always are.
//! 5. `SoftCompliance` (soft): no soft preference is violated.
//!
//! A soft stage that would remove every candidate is skipped (the set is
//! widened back to its input). A hard stage that empties the set fails
//! with [`SchedulingError::ExhaustedCandidates`] naming the stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::Candidate;
use crate::error::{Result, SchedulingError};
use crate::ledger::ResourceLedger;
use crate::models::{Day, SessionSpec};
use crate::scoring::{LoadTracker, SoftScorer};

/// A named narrowing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterStage {
    /// Enumeration: a venue compatible with mode and capacity exists.
    Capacity,
    /// Slot length and day match.
    DurationDay,
    /// Lecturer is free.
    Lecturer,
    /// Group and class are free.
    GroupClass,
    /// Venue is free.
    Venue,
    /// Soft preferences hold.
    SoftCompliance,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterStage::Capacity => "capacity",
            FilterStage::DurationDay => "duration_day",
            FilterStage::Lecturer => "lecturer",
            FilterStage::GroupClass => "group_class",
            FilterStage::Venue => "venue",
            FilterStage::SoftCompliance => "soft_compliance",
        };
        f.write_str(name)
    }
}

/// Whether a stage may be skipped when it would empty the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strictness {
    /// Emptying the set is a failure.
    Hard,
    /// Emptying the set falls back to the stage's input.
    Soft,
}

/// Everything a stage needs to judge a candidate.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// Session being placed.
    pub spec: &'a SessionSpec,
    /// Committed and tentatively accepted bookings.
    pub ledger: &'a ResourceLedger,
    /// Per-(group, day) load.
    pub loads: &'a LoadTracker,
    /// Soft-constraint scorer.
    pub scorer: SoftScorer<'a>,
    /// Allowed days; empty means every day.
    pub allowed_days: &'a [Day],
}

impl FilterStage {
    /// Whether `candidate` passes this stage.
    pub fn admits(&self, candidate: &Candidate, ctx: &FilterContext<'_>) -> bool {
        let spec = ctx.spec;
        let interval = &candidate.interval;
        match self {
            FilterStage::Capacity => candidate.venue.fits(spec.student_count),
            FilterStage::DurationDay => {
                interval.duration_min() == spec.required_duration_min
                    && (ctx.allowed_days.is_empty() || ctx.allowed_days.contains(&interval.day))
            }
            FilterStage::Lecturer => !ctx.ledger.is_busy(&spec.lecturer_key(), interval),
            FilterStage::GroupClass => {
                let group_free = spec
                    .group_key()
                    .is_none_or(|g| !ctx.ledger.is_busy(&g, interval));
                group_free && !ctx.ledger.is_busy(&spec.class_key(), interval)
            }
            FilterStage::Venue => {
                candidate.venue.is_remote || !ctx.ledger.is_busy(&candidate.venue.key(), interval)
            }
            FilterStage::SoftCompliance => ctx
                .scorer
                .score_slot(spec, interval, candidate.mode, ctx.loads)
                .is_soft_compliant(),
        }
    }
}

/// Result of running the pipeline.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Surviving candidates.
    pub candidates: Vec<Candidate>,
    /// Soft stages that were skipped because they would empty the set.
    pub widened: Vec<FilterStage>,
}

/// An ordered list of tagged stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPipeline {
    stages: Vec<(FilterStage, Strictness)>,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl FilterPipeline {
    /// Duration/day → lecturer → group/class → venue → soft compliance.
    pub fn standard() -> Self {
        Self {
            stages: vec![
                (FilterStage::DurationDay, Strictness::Hard),
                (FilterStage::Lecturer, Strictness::Hard),
                (FilterStage::GroupClass, Strictness::Soft),
                (FilterStage::Venue, Strictness::Soft),
                (FilterStage::SoftCompliance, Strictness::Soft),
            ],
        }
    }

    /// Creates a pipeline from explicit stages.
    pub fn new(stages: Vec<(FilterStage, Strictness)>) -> Self {
        Self { stages }
    }

    /// Changes the strictness of a stage already in the pipeline.
    pub fn with_strictness(mut self, stage: FilterStage, strictness: Strictness) -> Self {
        for (s, st) in &mut self.stages {
            if *s == stage {
                *st = strictness;
            }
        }
        self
    }

    /// Stages in order.
    pub fn stages(&self) -> &[(FilterStage, Strictness)] {
        &self.stages
    }

    /// Runs every stage over `candidates`.
    ///
    /// An empty input fails at [`FilterStage::Capacity`].
    pub fn run(&self, candidates: Vec<Candidate>, ctx: &FilterContext<'_>) -> Result<FilterOutcome> {
        if candidates.is_empty() {
            return Err(SchedulingError::ExhaustedCandidates {
                session: ctx.spec.session_ref.clone(),
                stage: FilterStage::Capacity,
            });
        }

        let mut current = candidates;
        let mut widened = Vec::new();

        for &(stage, strictness) in &self.stages {
            let kept: Vec<Candidate> = current
                .iter()
                .filter(|c| stage.admits(c, ctx))
                .cloned()
                .collect();

            if !kept.is_empty() {
                current = kept;
                continue;
            }
            match strictness {
                Strictness::Hard => {
                    return Err(SchedulingError::ExhaustedCandidates {
                        session: ctx.spec.session_ref.clone(),
                        stage,
                    });
                }
                Strictness::Soft => {
                    debug!(
                        session = %ctx.spec.session_ref,
                        %stage,
                        remaining = current.len(),
                        "soft filter stage would empty the set; widening"
                    );
                    widened.push(stage);
                }
            }
        }

        Ok(FilterOutcome {
            candidates: current,
            widened,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoftConstraintConfig;
    use crate::filter::enumerate_candidates;
    use crate::models::{DeliveryMode, SessionAssignment, TimeInterval, TimeSlot, Venue};

    fn slots() -> Vec<TimeSlot> {
        vec![
            TimeSlot::hours(Day::Monday, 8, 10),
            TimeSlot::hours(Day::Monday, 10, 12),
            TimeSlot::hours(Day::Tuesday, 8, 10),
            TimeSlot::hours(Day::Tuesday, 10, 11),
        ]
    }

    fn spec() -> SessionSpec {
        SessionSpec::simple("U1", "C1", "L1", 2, DeliveryMode::Physical).with_group("G1")
    }

    fn other(unit: &str, lecturer: &str, class: &str, group: &str) -> SessionSpec {
        SessionSpec::simple(unit, class, lecturer, 2, DeliveryMode::Physical).with_group(group)
    }

    fn run(
        spec: &SessionSpec,
        venues: &[Venue],
        ledger: &ResourceLedger,
        days: &[Day],
    ) -> Result<FilterOutcome> {
        run_with_loads(spec, venues, ledger, &LoadTracker::new(), days)
    }

    fn run_with_loads(
        spec: &SessionSpec,
        venues: &[Venue],
        ledger: &ResourceLedger,
        loads: &LoadTracker,
        days: &[Day],
    ) -> Result<FilterOutcome> {
        let config = SoftConstraintConfig::default();
        let ctx = FilterContext {
            spec,
            ledger,
            loads,
            scorer: SoftScorer::new(&config),
            allowed_days: days,
        };
        let cands = enumerate_candidates(spec, &slots(), venues);
        FilterPipeline::standard().run(cands, &ctx)
    }

    #[test]
    fn test_duration_filter() {
        let out = run(&spec(), &[Venue::new("R1", 40)], &ResourceLedger::new(), &[]).unwrap();
        // Only the three 2-hour slots survive.
        assert_eq!(out.candidates.len(), 3);
        assert!(out.widened.is_empty());
    }

    #[test]
    fn test_day_filter() {
        let out = run(&spec(), &[Venue::new("R1", 40)], &ResourceLedger::new(), &[Day::Tuesday]).unwrap();
        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.candidates[0].interval.day, Day::Tuesday);
    }

    #[test]
    fn test_lecturer_busy_everywhere_is_hard_failure() {
        let room = Venue::new("R9", 40);
        let bookings: Vec<SessionAssignment> = slots()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                SessionAssignment::new(&other(&format!("X{i}"), "L1", "C9", "G9"), s.interval(), &room, DeliveryMode::Physical)
            })
            .collect();
        let ledger = ResourceLedger::from_assignments(&bookings);
        let err = run(&spec(), &[Venue::new("R1", 40)], &ledger, &[]).unwrap_err();
        assert_eq!(
            err,
            SchedulingError::ExhaustedCandidates {
                session: spec().session_ref,
                stage: FilterStage::Lecturer
            }
        );
    }

    #[test]
    fn test_venue_stage_widens_when_all_rooms_busy() {
        let room = Venue::new("R1", 40);
        let bookings: Vec<SessionAssignment> = slots()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                SessionAssignment::new(&other(&format!("X{i}"), "L9", "C9", "G9"), s.interval(), &room, DeliveryMode::Physical)
            })
            .collect();
        let ledger = ResourceLedger::from_assignments(&bookings);
        let out = run(&spec(), std::slice::from_ref(&room), &ledger, &[]).unwrap();
        assert_eq!(out.candidates.len(), 3);
        assert_eq!(out.widened, vec![FilterStage::Venue]);
    }

    #[test]
    fn test_group_stage_widens_when_group_always_busy() {
        // G1 sits in another lecturer's session in every 2-hour slot.
        let room = Venue::new("R9", 40);
        let bookings: Vec<SessionAssignment> = slots()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                SessionAssignment::new(&other(&format!("X{i}"), "L9", "C9", "G1"), s.interval(), &room, DeliveryMode::Physical)
            })
            .collect();
        let ledger = ResourceLedger::from_assignments(&bookings);
        let out = run(&spec(), &[Venue::new("R1", 40)], &ledger, &[]).unwrap();
        assert_eq!(out.candidates.len(), 3);
        assert_eq!(out.widened, vec![FilterStage::GroupClass]);
    }

    #[test]
    fn test_soft_compliance_widens_when_every_day_is_capped() {
        // G1 already has the default two physical sessions on both days.
        let room = Venue::new("R9", 40);
        let booked: Vec<SessionAssignment> = [Day::Monday, Day::Tuesday]
            .iter()
            .flat_map(|&d| [TimeInterval::hours(d, 16, 17), TimeInterval::hours(d, 18, 19)])
            .enumerate()
            .map(|(i, interval)| {
                SessionAssignment::new(&other(&format!("X{i}"), "L9", "C9", "G1"), interval, &room, DeliveryMode::Physical)
            })
            .collect();
        let loads = LoadTracker::from_assignments(&booked);
        let out = run_with_loads(&spec(), &[Venue::new("R1", 40)], &ResourceLedger::new(), &loads, &[]).unwrap();
        assert_eq!(out.candidates.len(), 3);
        assert_eq!(out.widened, vec![FilterStage::SoftCompliance]);
    }

    #[test]
    fn test_group_stage_narrows() {
        let room = Venue::new("R9", 40);
        let busy = SessionAssignment::new(
            &other("X1", "L9", "C9", "G1"),
            TimeInterval::hours(Day::Monday, 8, 10),
            &room,
            DeliveryMode::Physical,
        );
        let ledger = ResourceLedger::from_assignments(&[busy]);
        let out = run(&spec(), &[Venue::new("R1", 40)], &ledger, &[]).unwrap();
        assert_eq!(out.candidates.len(), 2);
        assert!(out
            .candidates
            .iter()
            .all(|c| c.interval != TimeInterval::hours(Day::Monday, 8, 10)));
    }

    #[test]
    fn test_empty_enumeration_fails_at_capacity() {
        let s = spec().with_students(1000);
        let err = run(&s, &[Venue::new("R1", 40)], &ResourceLedger::new(), &[]).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::ExhaustedCandidates {
                stage: FilterStage::Capacity,
                ..
            }
        ));
    }

    #[test]
    fn test_no_matching_duration_fails_at_duration_day() {
        let s = SessionSpec::simple("U1", "C1", "L1", 3, DeliveryMode::Physical);
        let err = run(&s, &[Venue::new("R1", 40)], &ResourceLedger::new(), &[]).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::ExhaustedCandidates {
                stage: FilterStage::DurationDay,
                ..
            }
        ));
    }

    #[test]
    fn test_with_strictness() {
        let p = FilterPipeline::standard().with_strictness(FilterStage::Venue, Strictness::Hard);
        assert!(p
            .stages()
            .contains(&(FilterStage::Venue, Strictness::Hard)));
    }
}
