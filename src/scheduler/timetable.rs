//! Timetabling facade.
//!
//! # Paths
//!
//! 1. **Single-session**: units → decomposer → assigner (filter, score,
//!    re-check) → one atomic commit. See [`TimetableScheduler::schedule_units`].
//! 2. **Whole-schedule**: session specs + committed bookings → SA, GA or
//!    backtracking → [`TimetableScheduler::commit_solution`].
//!
//! Both paths validate their input first and read conflicts from the
//! store; neither holds anything across calls.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::assign::{AssignMode, SessionAssigner, SessionFailure};
use crate::commit::{commit_batch, commit_replacing, CommitOutcome, ScheduleStore};
use crate::config::SchedulerConfig;
use crate::decompose::decompose;
use crate::error::{Result, SchedulingError};
use crate::filter::FilterPipeline;
use crate::models::{Day, Enrollment, SessionAssignment, SessionRef, SessionSpec, TimeSlot, Unit, Venue};
use crate::scoring::LoadTracker;
use crate::solver::{self, SearchSpace, SolveReport, SolverKind};
use crate::validation::validate_input;

use super::kpi::TimetableKpi;

/// One unit to schedule under one enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRequest {
    /// Unit and its credit hours.
    pub unit: Unit,
    /// Who teaches it to whom.
    pub enrollment: Enrollment,
}

impl UnitRequest {
    /// Creates a new request.
    pub fn new(unit: Unit, enrollment: Enrollment) -> Self {
        Self { unit, enrollment }
    }
}

/// Result of the single-session path.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Assignments written to the store.
    pub committed: Vec<SessionAssignment>,
    /// Sessions that were not placed, or lost a race at commit.
    pub failures: Vec<SessionFailure>,
}

impl BatchReport {
    /// Whether every session was committed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Entry point for both scheduling paths over fixed catalogs.
///
/// # Example
///
/// ```
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use u_timetable::assign::AssignMode;
/// use u_timetable::commit::{InMemoryStore, ScheduleStore};
/// use u_timetable::config::SchedulerConfig;
/// use u_timetable::models::{Day, Enrollment, TimeSlot, Unit, Venue};
/// use u_timetable::scheduler::TimetableScheduler;
///
/// let slots = vec![TimeSlot::hours(Day::Monday, 8, 10), TimeSlot::hours(Day::Tuesday, 14, 15)];
/// let venues = vec![Venue::new("R1", 40)];
/// let scheduler = TimetableScheduler::new(SchedulerConfig::default(), slots, venues);
///
/// let mut store = InMemoryStore::new();
/// let mut rng = SmallRng::seed_from_u64(42);
/// let report = scheduler
///     .schedule_unit(
///         &Unit::new("CS101", 3),
///         &Enrollment::new("CS101", "C1", "L1", 30),
///         AssignMode::Optimized,
///         &mut store,
///         &mut rng,
///     )
///     .unwrap();
/// assert_eq!(report.committed.len(), 2);
/// assert_eq!(store.bookings().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableScheduler {
    config: SchedulerConfig,
    slots: Vec<TimeSlot>,
    venues: Vec<Venue>,
    pipeline: FilterPipeline,
    allowed_days: Vec<Day>,
}

impl TimetableScheduler {
    /// Creates a scheduler over the given catalogs.
    pub fn new(config: SchedulerConfig, slots: Vec<TimeSlot>, venues: Vec<Venue>) -> Self {
        Self {
            config,
            slots,
            venues,
            pipeline: FilterPipeline::standard(),
            allowed_days: Vec::new(),
        }
    }

    /// Replaces the single-session filter pipeline.
    pub fn with_pipeline(mut self, pipeline: FilterPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Restricts the single-session path to `days` (empty = every day).
    pub fn with_allowed_days(mut self, days: Vec<Day>) -> Self {
        self.allowed_days = days;
        self
    }

    /// Tuning parameters.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Slot catalog.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Venue catalog.
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// Decomposes every request, in request order.
    ///
    /// A unit without credit hours yields no sessions and one
    /// [`SchedulingError::InputDataMissing`] failure on its first session
    /// ref. The call itself fails only when no unit yields a session.
    pub fn decompose_units(&self, requests: &[UnitRequest]) -> Result<(Vec<SessionSpec>, Vec<SessionFailure>)> {
        if requests.is_empty() {
            return Err(SchedulingError::InputDataMissing("no units to schedule".into()));
        }
        let mut sessions = Vec::new();
        let mut failures = Vec::new();
        for request in requests {
            let specs = decompose(&request.unit, &request.enrollment, self.config.decomposition);
            if specs.is_empty() {
                let e = &request.enrollment;
                failures.push(SessionFailure {
                    session_ref: SessionRef {
                        unit_id: request.unit.id.clone(),
                        semester: e.semester.clone(),
                        class_id: e.class_id.clone(),
                        group_id: e.group_id.clone(),
                        index: 0,
                    },
                    error: SchedulingError::InputDataMissing(format!(
                        "unit {} has no credit hours",
                        request.unit.id
                    )),
                });
                continue;
            }
            sessions.extend(specs);
        }
        if sessions.is_empty() {
            return Err(failures
                .into_iter()
                .next()
                .map(|f| f.error)
                .unwrap_or_else(|| SchedulingError::InputDataMissing("no sessions to schedule".into())));
        }
        Ok((sessions, failures))
    }

    /// Session specs of every request, skipping units without credit hours.
    pub fn sessions_for(&self, requests: &[UnitRequest]) -> Result<Vec<SessionSpec>> {
        let (sessions, skipped) = self.decompose_units(requests)?;
        for failure in &skipped {
            warn!(session = %failure.session_ref, error = %failure.error, "unit skipped");
        }
        Ok(sessions)
    }

    /// Fails fast on empty catalogs, then on structural problems.
    fn check_input(&self, sessions: &[SessionSpec]) -> Result<()> {
        if self.slots.is_empty() {
            return Err(SchedulingError::InputDataMissing("time slot catalog is empty".into()));
        }
        if self.venues.is_empty() {
            return Err(SchedulingError::InputDataMissing("venue catalog is empty".into()));
        }
        if sessions.is_empty() {
            return Err(SchedulingError::InputDataMissing("no sessions to schedule".into()));
        }
        validate_input(&self.slots, &self.venues, sessions).map_err(SchedulingError::InvalidInput)
    }

    /// Schedules one unit and commits its sessions.
    pub fn schedule_unit<S: ScheduleStore + ?Sized, R: Rng>(
        &self,
        unit: &Unit,
        enrollment: &Enrollment,
        mode: AssignMode,
        store: &mut S,
        rng: &mut R,
    ) -> Result<BatchReport> {
        let request = UnitRequest::new(unit.clone(), enrollment.clone());
        self.schedule_units(std::slice::from_ref(&request), mode, store, rng)
    }

    /// Schedules several units and commits all accepted sessions in one
    /// atomic write.
    ///
    /// Unplaceable sessions are reported in [`BatchReport::failures`]; a
    /// failed write is returned as [`SchedulingError::Store`] and leaves
    /// the store unchanged.
    #[instrument(skip_all, fields(units = requests.len(), mode = ?mode))]
    pub fn schedule_units<S: ScheduleStore + ?Sized, R: Rng>(
        &self,
        requests: &[UnitRequest],
        mode: AssignMode,
        store: &mut S,
        rng: &mut R,
    ) -> Result<BatchReport> {
        let (sessions, unit_failures) = self.decompose_units(requests)?;
        self.check_input(&sessions)?;

        let bookings = store.bookings();
        let mut ledger = store.ledger();
        let mut loads = LoadTracker::from_assignments(&bookings);

        let assigner = SessionAssigner::new(&self.slots, &self.venues, &self.config.soft)
            .with_pipeline(self.pipeline.clone())
            .with_allowed_days(self.allowed_days.clone());
        let outcome = assigner.assign_all(&sessions, &mut ledger, &mut loads, mode, rng);

        let CommitOutcome { committed, rejected } = commit_batch(store, &outcome.assigned)?;
        let mut failures = unit_failures;
        failures.extend(outcome.failures);
        failures.extend(rejected);

        info!(
            sessions = sessions.len(),
            committed = committed.len(),
            failed = failures.len(),
            "batch scheduled"
        );
        Ok(BatchReport { committed, failures })
    }

    /// Searches for a whole schedule of `sessions` with the chosen solver.
    ///
    /// Committed bookings of other sessions are pinned. `seed`, typically
    /// the current schedule, is the starting point for annealing and one
    /// member of the GA population.
    #[instrument(skip_all, fields(algorithm = %kind, sessions = sessions.len()))]
    pub fn solve<S: ScheduleStore + ?Sized, R: Rng>(
        &self,
        kind: SolverKind,
        sessions: Vec<SessionSpec>,
        store: &S,
        seed: Option<&[SessionAssignment]>,
        rng: &mut R,
    ) -> Result<SolveReport> {
        self.check_input(&sessions)?;
        let space = SearchSpace::new(sessions, self.slots.clone(), &self.venues, store.bookings())?;
        let seed = seed.map(|existing| space.seed_solution(existing, rng));
        solver::solve(kind, &space, &self.config, seed, rng)
    }

    /// Commits a solver result, replacing any committed bookings of the
    /// same sessions.
    ///
    /// Sessions that clash with the store (or with each other) are dropped
    /// by the re-check and returned in [`CommitOutcome::rejected`].
    pub fn commit_solution<S: ScheduleStore + ?Sized>(
        &self,
        report: &SolveReport,
        store: &mut S,
    ) -> Result<CommitOutcome> {
        if !report.is_feasible() {
            warn!(
                final_conflicts = report.final_conflicts,
                "committing a solution with conflicts; clashing sessions will be rejected"
            );
        }
        commit_replacing(store, &report.assignments)
    }

    /// KPIs of `assignments` against this scheduler's catalogs.
    pub fn kpi(&self, assignments: &[SessionAssignment]) -> TimetableKpi {
        TimetableKpi::calculate(assignments, &self.slots, &self.config.soft)
    }
}
