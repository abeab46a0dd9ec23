//! Commit step: re-check, then write a batch atomically.
//!
//! The committed schedule lives behind [`ScheduleStore`]. Before writing,
//! [`recheck`] re-verifies lecturer, venue and group non-overlap of every
//! assignment against the store's current bookings (and the batch's own
//! earlier entries). Raced sessions are dropped from the batch with
//! [`SchedulingError::HardConstraintViolation`]; the rest is written in one
//! all-or-nothing [`ScheduleStore::write_batch`].
//!
//! Re-solved sessions that are already committed go through
//! [`commit_replacing`] instead: their old bookings are ignored by the
//! re-check and swapped out by [`ScheduleStore::replace_batch`].
//!
//! Concurrent requests are not serialized beyond the atomic write, so two
//! writers can still race between re-check and write.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::assign::SessionFailure;
use crate::error::{Result, SchedulingError};
use crate::ledger::ResourceLedger;
use crate::models::{Day, ResourceKey, SessionAssignment, SessionRef};

/// Failures of the committed-session store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store cannot hold more bookings.
    #[error("store capacity of {limit} booking(s) exceeded")]
    CapacityExceeded { limit: usize },

    /// The session is already committed.
    #[error("session {0} is already committed")]
    DuplicateSession(SessionRef),

    /// The backing store rejected the write.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Committed bookings, queryable by day and resource.
pub trait ScheduleStore {
    /// Every committed booking.
    fn bookings(&self) -> Vec<SessionAssignment>;

    /// Writes `batch` atomically: either every assignment is stored or none.
    fn write_batch(&mut self, batch: &[SessionAssignment]) -> std::result::Result<(), StoreError>;

    /// Atomically removes every booking of `released` and inserts `batch`.
    fn replace_batch(
        &mut self,
        released: &[SessionRef],
        batch: &[SessionAssignment],
    ) -> std::result::Result<(), StoreError>;

    /// Bookings on `day`.
    fn bookings_on(&self, day: Day) -> Vec<SessionAssignment> {
        self.bookings()
            .into_iter()
            .filter(|a| a.interval.day == day)
            .collect()
    }

    /// Bookings on `day` that hold `key`.
    fn bookings_for(&self, key: &ResourceKey, day: Day) -> Vec<SessionAssignment> {
        self.bookings_on(day)
            .into_iter()
            .filter(|a| {
                a.hard_keys().contains(key)
                    || *key == ResourceKey::Class(a.session_ref.class_id.clone())
            })
            .collect()
    }

    /// A ledger over the current bookings.
    fn ledger(&self) -> ResourceLedger {
        ResourceLedger::from_assignments(&self.bookings())
    }
}

/// In-memory store with stage-then-swap atomic writes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    bookings: Vec<SessionAssignment>,
    capacity_limit: Option<usize>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with committed bookings.
    pub fn with_bookings(bookings: Vec<SessionAssignment>) -> Self {
        Self {
            bookings,
            capacity_limit: None,
        }
    }

    /// Caps the number of bookings; writes that would exceed it fail.
    pub fn with_capacity_limit(mut self, limit: usize) -> Self {
        self.capacity_limit = Some(limit);
        self
    }

    /// Number of committed bookings.
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    /// Whether nothing is committed.
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

impl ScheduleStore for InMemoryStore {
    fn bookings(&self) -> Vec<SessionAssignment> {
        self.bookings.clone()
    }

    fn write_batch(&mut self, batch: &[SessionAssignment]) -> std::result::Result<(), StoreError> {
        self.replace_batch(&[], batch)
    }

    fn replace_batch(
        &mut self,
        released: &[SessionRef],
        batch: &[SessionAssignment],
    ) -> std::result::Result<(), StoreError> {
        let mut staged: Vec<SessionAssignment> = self
            .bookings
            .iter()
            .filter(|b| !released.contains(&b.session_ref))
            .cloned()
            .collect();
        for assignment in batch {
            if let Some(limit) = self.capacity_limit {
                if staged.len() >= limit {
                    return Err(StoreError::CapacityExceeded { limit });
                }
            }
            if staged.iter().any(|b| b.session_ref == assignment.session_ref) {
                return Err(StoreError::DuplicateSession(assignment.session_ref.clone()));
            }
            staged.push(assignment.clone());
        }
        self.bookings = staged;
        Ok(())
    }
}

/// Result of re-checking a batch against the store.
#[derive(Debug, Clone, Default)]
pub struct Recheck {
    /// Assignments that still hold.
    pub clean: Vec<SessionAssignment>,
    /// Assignments that now overlap an exclusive resource.
    pub raced: Vec<SessionFailure>,
}

/// Splits `batch` into assignments that still hold and raced ones.
///
/// Committed bookings of the batch's own sessions are left out, since the
/// batch supersedes them. Each clean assignment is booked before the next
/// is checked, so two clashing entries of the same batch are caught too.
pub fn recheck<S: ScheduleStore + ?Sized>(store: &S, batch: &[SessionAssignment]) -> Recheck {
    let superseded: HashSet<&SessionRef> = batch.iter().map(|a| &a.session_ref).collect();
    let others: Vec<SessionAssignment> = store
        .bookings()
        .into_iter()
        .filter(|b| !superseded.contains(&b.session_ref))
        .collect();
    let mut ledger = ResourceLedger::from_assignments(&others);
    let mut outcome = Recheck::default();
    for assignment in batch {
        let conflicts = ledger.hard_conflicts(assignment);
        if conflicts.is_empty() {
            ledger.book(assignment);
            outcome.clean.push(assignment.clone());
        } else {
            warn!(
                session = %assignment.session_ref,
                conflicts = conflicts.len(),
                "booking raced with a committed session"
            );
            outcome.raced.push(SessionFailure {
                session_ref: assignment.session_ref.clone(),
                error: SchedulingError::HardConstraintViolation {
                    session: assignment.session_ref.clone(),
                    conflicts,
                },
            });
        }
    }
    outcome
}

/// What a commit wrote and what it dropped.
#[derive(Debug, Clone, Default)]
pub struct CommitOutcome {
    /// Assignments now in the store.
    pub committed: Vec<SessionAssignment>,
    /// Assignments dropped by the re-check.
    pub rejected: Vec<SessionFailure>,
}

/// Re-checks `batch` and writes the clean part atomically.
///
/// A failed write leaves the store untouched and returns
/// [`SchedulingError::Store`].
#[instrument(skip_all, fields(batch = batch.len()))]
pub fn commit_batch<S: ScheduleStore + ?Sized>(store: &mut S, batch: &[SessionAssignment]) -> Result<CommitOutcome> {
    let Recheck { clean, raced } = recheck(store, batch);
    if let Err(e) = store.write_batch(&clean) {
        warn!(error = %e, "batch write failed; rolled back");
        return Err(e.into());
    }
    info!(committed = clean.len(), rejected = raced.len(), "batch committed");
    Ok(CommitOutcome {
        committed: clean,
        rejected: raced,
    })
}

/// Re-checks `batch` and swaps it in for the store's bookings of the same
/// sessions in one atomic write.
///
/// Every session of the batch loses its old booking, including raced
/// ones; those come back in [`CommitOutcome::rejected`] for re-placement.
#[instrument(skip_all, fields(batch = batch.len()))]
pub fn commit_replacing<S: ScheduleStore + ?Sized>(
    store: &mut S,
    batch: &[SessionAssignment],
) -> Result<CommitOutcome> {
    let Recheck { clean, raced } = recheck(store, batch);
    let released: Vec<SessionRef> = batch.iter().map(|a| a.session_ref.clone()).collect();
    if let Err(e) = store.replace_batch(&released, &clean) {
        warn!(error = %e, "batch replace failed; rolled back");
        return Err(e.into());
    }
    info!(committed = clean.len(), rejected = raced.len(), "batch replaced");
    Ok(CommitOutcome {
        committed: clean,
        rejected: raced,
    })
}
