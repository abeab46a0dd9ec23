//! Resource ledger.
//!
//! Indexes committed bookings by `(resource, day)` and answers
//! "is resource R busy during interval I on day D".
//!
//! # Busy test
//! `existing.start < candidate.end && candidate.start < existing.end`,
//! scoped to the same resource and day. Remote venues are never booked,
//! so they are never busy.

use std::collections::HashMap;

use crate::models::{Day, ResourceKey, SessionAssignment, SessionRef, TimeInterval};

/// One booked interval on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// When the resource is held.
    pub interval: TimeInterval,
    /// Session holding it.
    pub session_ref: SessionRef,
}

/// Busy-time index over committed (and tentatively accepted) assignments.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    entries: HashMap<(ResourceKey, Day), Vec<LedgerEntry>>,
    booked: usize,
}

impl ResourceLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from existing assignments.
    pub fn from_assignments<'a>(assignments: impl IntoIterator<Item = &'a SessionAssignment>) -> Self {
        let mut ledger = Self::new();
        for a in assignments {
            ledger.book(a);
        }
        ledger
    }

    /// Books an assignment on all resources it occupies.
    ///
    /// Besides the exclusive resources (lecturer, non-remote venue, group)
    /// the class is recorded too, so class availability can be queried.
    pub fn book(&mut self, assignment: &SessionAssignment) {
        let mut keys = assignment.hard_keys();
        keys.push(ResourceKey::Class(assignment.session_ref.class_id.clone()));
        for key in keys {
            self.entries
                .entry((key, assignment.interval.day))
                .or_default()
                .push(LedgerEntry {
                    interval: assignment.interval,
                    session_ref: assignment.session_ref.clone(),
                });
        }
        self.booked += 1;
    }

    /// Whether `key` is busy at any point of `interval`.
    pub fn is_busy(&self, key: &ResourceKey, interval: &TimeInterval) -> bool {
        self.entries_for(key, interval.day)
            .iter()
            .any(|e| e.interval.overlaps(interval))
    }

    /// Like [`is_busy`](Self::is_busy) but ignores bookings held by `session`.
    pub fn is_busy_for_other(
        &self,
        key: &ResourceKey,
        interval: &TimeInterval,
        session: &SessionRef,
    ) -> bool {
        self.entries_for(key, interval.day)
            .iter()
            .any(|e| e.session_ref != *session && e.interval.overlaps(interval))
    }

    /// Exclusive resources of `assignment` that are already held by
    /// another session during its interval.
    ///
    /// Bookings made by the same session are ignored, so re-checking an
    /// assignment that is already committed reports nothing.
    pub fn hard_conflicts(&self, assignment: &SessionAssignment) -> Vec<ResourceKey> {
        assignment
            .hard_keys()
            .into_iter()
            .filter(|k| self.is_busy_for_other(k, &assignment.interval, &assignment.session_ref))
            .collect()
    }

    /// Bookings of a resource on a day.
    pub fn entries_for(&self, key: &ResourceKey, day: Day) -> &[LedgerEntry] {
        self.entries
            .get(&(key.clone(), day))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of assignments booked.
    pub fn len(&self) -> usize {
        self.booked
    }

    /// Whether nothing is booked.
    pub fn is_empty(&self) -> bool {
        self.booked == 0
    }
}
