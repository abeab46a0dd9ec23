//! Single-session assigner.
//!
//! Places one session at a time against a working ledger.
//!
//! # Modes
//!
//! - [`AssignMode::Random`]: uniform pick among filtered candidates that
//!   pass the hard re-check.
//! - [`AssignMode::Optimized`]: slots ranked by soft score (negatives
//!   dropped), then a venue sub-search per slot (remote bonus, tightest
//!   physical fit). The first slot whose best venue clears the re-check
//!   wins. Falls back to random when nothing qualifies.
//!
//! Batches are placed in input order. Each accepted placement is booked
//! into the working ledger so later sessions of the batch see it.

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::SoftConstraintConfig;
use crate::error::{Result, SchedulingError};
use crate::filter::{enumerate_candidates, Candidate, FilterContext, FilterPipeline};
use crate::ledger::ResourceLedger;
use crate::models::{Day, SessionAssignment, SessionRef, SessionSpec, TimeSlot, Venue};
use crate::scoring::{LoadTracker, SoftScorer};

/// Candidate selection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignMode {
    /// Uniform choice among eligible candidates.
    Random,
    /// Best-scoring slot, tightest venue.
    #[default]
    Optimized,
}

/// A session that could not be placed, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFailure {
    /// Session that failed.
    pub session_ref: SessionRef,
    /// Why it failed.
    pub error: SchedulingError,
}

/// Outcome of assigning a batch: placements and per-session failures.
#[derive(Debug, Clone, Default)]
pub struct AssignOutcome {
    /// Accepted placements, in input order.
    pub assigned: Vec<SessionAssignment>,
    /// Sessions that could not be placed.
    pub failures: Vec<SessionFailure>,
}

/// Places sessions one by one over fixed slot and venue catalogs.
#[derive(Debug, Clone)]
pub struct SessionAssigner<'a> {
    slots: &'a [TimeSlot],
    venues: &'a [Venue],
    config: &'a SoftConstraintConfig,
    pipeline: FilterPipeline,
    allowed_days: Vec<Day>,
}

impl<'a> SessionAssigner<'a> {
    /// Creates an assigner with the standard pipeline and every day allowed.
    pub fn new(slots: &'a [TimeSlot], venues: &'a [Venue], config: &'a SoftConstraintConfig) -> Self {
        Self {
            slots,
            venues,
            config,
            pipeline: FilterPipeline::standard(),
            allowed_days: Vec::new(),
        }
    }

    /// Replaces the filter pipeline.
    pub fn with_pipeline(mut self, pipeline: FilterPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Restricts placement to `days` (empty = every day).
    pub fn with_allowed_days(mut self, days: Vec<Day>) -> Self {
        self.allowed_days = days;
        self
    }

    fn scorer(&self) -> SoftScorer<'a> {
        SoftScorer::new(self.config)
    }

    /// Enumerates and filters candidates for `spec`.
    pub fn candidates(
        &self,
        spec: &SessionSpec,
        ledger: &ResourceLedger,
        loads: &LoadTracker,
    ) -> Result<Vec<Candidate>> {
        let ctx = FilterContext {
            spec,
            ledger,
            loads,
            scorer: self.scorer(),
            allowed_days: &self.allowed_days,
        };
        let raw = enumerate_candidates(spec, self.slots, self.venues);
        Ok(self.pipeline.run(raw, &ctx)?.candidates)
    }

    /// Places one session.
    ///
    /// Fails with [`SchedulingError::ExhaustedCandidates`] when a hard stage
    /// empties the set, or [`SchedulingError::HardConstraintViolation`]
    /// when no surviving candidate clears the re-check.
    #[instrument(skip_all, fields(session = %spec.session_ref, mode = ?mode))]
    pub fn assign<R: Rng>(
        &self,
        spec: &SessionSpec,
        ledger: &ResourceLedger,
        loads: &LoadTracker,
        mode: AssignMode,
        rng: &mut R,
    ) -> Result<SessionAssignment> {
        let candidates = self.candidates(spec, ledger, loads)?;

        if mode == AssignMode::Optimized {
            if let Some(best) = self.best_candidate(spec, &candidates, ledger, loads) {
                return Ok(best);
            }
            debug!("no non-negative slot cleared the re-check; falling back to random");
        }
        self.random_candidate(spec, &candidates, ledger, rng)
    }

    /// Places every session in order, booking each accepted placement
    /// into `ledger` and `loads`. Failures do not stop the batch.
    pub fn assign_all<R: Rng>(
        &self,
        specs: &[SessionSpec],
        ledger: &mut ResourceLedger,
        loads: &mut LoadTracker,
        mode: AssignMode,
        rng: &mut R,
    ) -> AssignOutcome {
        let mut outcome = AssignOutcome::default();
        for spec in specs {
            match self.assign(spec, ledger, loads, mode, rng) {
                Ok(assignment) => {
                    ledger.book(&assignment);
                    loads.record(&assignment);
                    outcome.assigned.push(assignment);
                }
                Err(error) => {
                    debug!(session = %spec.session_ref, %error, "session unschedulable");
                    outcome.failures.push(SessionFailure {
                        session_ref: spec.session_ref.clone(),
                        error,
                    });
                }
            }
        }
        outcome
    }

    fn best_candidate(
        &self,
        spec: &SessionSpec,
        candidates: &[Candidate],
        ledger: &ResourceLedger,
        loads: &LoadTracker,
    ) -> Option<SessionAssignment> {
        let scorer = self.scorer();

        // Group by slot, keeping first-seen order for stable ties.
        let mut by_slot: Vec<(&str, Vec<&Candidate>)> = Vec::new();
        for c in candidates {
            match by_slot.iter().position(|(id, _)| *id == c.slot_id) {
                Some(pos) => by_slot[pos].1.push(c),
                None => by_slot.push((c.slot_id.as_str(), vec![c])),
            }
        }

        let mut ranked: Vec<(f64, Vec<&Candidate>)> = by_slot
            .into_iter()
            .filter_map(|(_, group)| {
                let first = group.first()?;
                let score = scorer
                    .score_slot(spec, &first.interval, first.mode, loads)
                    .total();
                (score >= 0.0).then_some((score, group))
            })
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, mut venues) in ranked {
            venues.sort_by(|a, b| {
                let sa = scorer.venue_score(&a.venue, spec.student_count);
                let sb = scorer.venue_score(&b.venue, spec.student_count);
                sb.total_cmp(&sa)
            });
            let accepted = venues
                .iter()
                .map(|c| c.to_assignment(spec))
                .find(|a| ledger.hard_conflicts(a).is_empty());
            if accepted.is_some() {
                return accepted;
            }
        }
        None
    }

    fn random_candidate<R: Rng>(
        &self,
        spec: &SessionSpec,
        candidates: &[Candidate],
        ledger: &ResourceLedger,
        rng: &mut R,
    ) -> Result<SessionAssignment> {
        let eligible: Vec<SessionAssignment> = candidates
            .iter()
            .map(|c| c.to_assignment(spec))
            .filter(|a| ledger.hard_conflicts(a).is_empty())
            .collect();

        if let Some(choice) = eligible.choose(rng) {
            return Ok(choice.clone());
        }

        let conflicts = candidates
            .first()
            .map(|c| ledger.hard_conflicts(&c.to_assignment(spec)))
            .unwrap_or_default();
        Err(SchedulingError::HardConstraintViolation {
            session: spec.session_ref.clone(),
            conflicts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{detect_conflicts, DeliveryMode, TimeInterval};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn slots() -> Vec<TimeSlot> {
        vec![
            TimeSlot::hours(Day::Monday, 8, 10),
            TimeSlot::hours(Day::Monday, 13, 15),
            TimeSlot::hours(Day::Tuesday, 8, 10),
            TimeSlot::hours(Day::Monday, 10, 11),
            TimeSlot::hours(Day::Wednesday, 18, 19),
        ]
    }

    fn venues() -> Vec<Venue> {
        vec![Venue::new("Hall", 200), Venue::new("R1", 35), Venue::new("R2", 60)]
    }

    #[test]
    fn test_optimized_picks_tightest_venue() {
        let (slots, venues, config) = (slots(), venues(), SoftConstraintConfig::default());
        let assigner = SessionAssigner::new(&slots, &venues, &config);
        let spec = SessionSpec::simple("U1", "C1", "L1", 2, DeliveryMode::Physical).with_students(30);
        let mut rng = SmallRng::seed_from_u64(42);

        let a = assigner
            .assign(&spec, &ResourceLedger::new(), &LoadTracker::new(), AssignMode::Optimized, &mut rng)
            .unwrap();
        assert_eq!(a.venue, "R1");
        assert_eq!(a.interval.duration_min(), 120);
        assert_eq!(a.mode, DeliveryMode::Physical);
    }

    #[test]
    fn test_optimized_prefers_early_physical_slot() {
        let (slots, venues, config) = (slots(), venues(), SoftConstraintConfig::default());
        let assigner = SessionAssigner::new(&slots, &venues, &config);
        let spec = SessionSpec::simple("U1", "C1", "L1", 2, DeliveryMode::Physical);
        let mut rng = SmallRng::seed_from_u64(1);
        let a = assigner
            .assign(&spec, &ResourceLedger::new(), &LoadTracker::new(), AssignMode::Optimized, &mut rng)
            .unwrap();
        assert_eq!(a.interval.start_min, 8 * 60);
    }

    #[test]
    fn test_online_session_uses_remote_sentinel() {
        let (slots, venues, config) = (slots(), venues(), SoftConstraintConfig::default());
        let assigner = SessionAssigner::new(&slots, &venues, &config);
        let spec = SessionSpec::simple("U1", "C1", "L1", 1, DeliveryMode::Online);
        let mut rng = SmallRng::seed_from_u64(7);
        for mode in [AssignMode::Random, AssignMode::Optimized] {
            let a = assigner
                .assign(&spec, &ResourceLedger::new(), &LoadTracker::new(), mode, &mut rng)
                .unwrap();
            assert!(a.venue_is_remote);
            assert_eq!(a.venue, "Remote");
        }
    }

    #[test]
    fn test_random_mode_avoids_booked_venue() {
        let slots = vec![TimeSlot::hours(Day::Monday, 8, 10)];
        let venues = vec![Venue::new("R1", 40), Venue::new("R2", 40)];
        let config = SoftConstraintConfig::default();
        let assigner = SessionAssigner::new(&slots, &venues, &config);

        let other = SessionSpec::simple("U0", "C0", "L0", 2, DeliveryMode::Physical);
        let booked = SessionAssignment::new(&other, slots[0].interval(), &venues[0], DeliveryMode::Physical);
        let ledger = ResourceLedger::from_assignments(&[booked]);

        let spec = SessionSpec::simple("U1", "C1", "L1", 2, DeliveryMode::Physical);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..20 {
            let a = assigner
                .assign(&spec, &ledger, &LoadTracker::new(), AssignMode::Random, &mut rng)
                .unwrap();
            assert_eq!(a.venue, "R2");
        }
    }

    #[test]
    fn test_all_venues_busy_is_hard_violation() {
        let slots = vec![TimeSlot::hours(Day::Monday, 8, 10)];
        let venues = vec![Venue::new("R1", 40)];
        let config = SoftConstraintConfig::default();
        let assigner = SessionAssigner::new(&slots, &venues, &config);

        let other = SessionSpec::simple("U0", "C0", "L0", 2, DeliveryMode::Physical);
        let booked = SessionAssignment::new(&other, slots[0].interval(), &venues[0], DeliveryMode::Physical);
        let ledger = ResourceLedger::from_assignments(&[booked]);

        let spec = SessionSpec::simple("U1", "C1", "L1", 2, DeliveryMode::Physical);
        let mut rng = SmallRng::seed_from_u64(3);
        let err = assigner
            .assign(&spec, &ledger, &LoadTracker::new(), AssignMode::Optimized, &mut rng)
            .unwrap_err();
        match err {
            SchedulingError::HardConstraintViolation { conflicts, .. } => {
                assert_eq!(conflicts, vec![crate::models::ResourceKey::venue("R1")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_assign_all_books_between_sessions() {
        let slots = vec![
            TimeSlot::hours(Day::Monday, 8, 10),
            TimeSlot::hours(Day::Tuesday, 8, 10),
        ];
        let venues = vec![Venue::new("R1", 40)];
        let config = SoftConstraintConfig::default();
        let assigner = SessionAssigner::new(&slots, &venues, &config);

        let specs: Vec<SessionSpec> = (0..3)
            .map(|i| SessionSpec::simple(format!("U{i}"), "C1", "L1", 2, DeliveryMode::Physical))
            .collect();
        let mut ledger = ResourceLedger::new();
        let mut loads = LoadTracker::new();
        let mut rng = SmallRng::seed_from_u64(11);
        let outcome = assigner.assign_all(&specs, &mut ledger, &mut loads, AssignMode::Optimized, &mut rng);

        // Two slots for one lecturer: the third session cannot be placed.
        assert_eq!(outcome.assigned.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].session_ref, specs[2].session_ref);
        assert!(outcome.failures[0].error.is_per_session());
        assert!(detect_conflicts(&outcome.assigned).is_empty());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_allowed_days() {
        let (slots, venues, config) = (slots(), venues(), SoftConstraintConfig::default());
        let assigner = SessionAssigner::new(&slots, &venues, &config).with_allowed_days(vec![Day::Tuesday]);
        let spec = SessionSpec::simple("U1", "C1", "L1", 2, DeliveryMode::Physical);
        let mut rng = SmallRng::seed_from_u64(5);
        let a = assigner
            .assign(&spec, &ResourceLedger::new(), &LoadTracker::new(), AssignMode::Random, &mut rng)
            .unwrap();
        assert_eq!(a.interval, TimeInterval::hours(Day::Tuesday, 8, 10));
    }
}
