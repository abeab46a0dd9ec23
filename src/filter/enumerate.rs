//! Candidate enumeration.
//!
//! Produces the raw (slot × venue) pairs for a session. Venues are
//! restricted to those compatible with the session's mode: remote venues
//! for online sessions, physical venues with enough seats otherwise.
//! Duration and day matching happen in the first pipeline stage.

use crate::models::{
    physical_venues, remote_venues, DeliveryMode, SessionAssignment, SessionSpec, TimeInterval,
    TimeSlot, Venue,
};

/// One (slot, venue, mode) option for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Slot the interval comes from.
    pub slot_id: String,
    /// When the session would run.
    pub interval: TimeInterval,
    /// Where it would run.
    pub venue: Venue,
    /// How it would be delivered.
    pub mode: DeliveryMode,
}

impl Candidate {
    /// Builds a candidate from a slot and venue.
    pub fn new(slot: &TimeSlot, venue: Venue, mode: DeliveryMode) -> Self {
        Self {
            slot_id: slot.id.clone(),
            interval: slot.interval(),
            venue,
            mode,
        }
    }

    /// The assignment this candidate would produce for `spec`.
    pub fn to_assignment(&self, spec: &SessionSpec) -> SessionAssignment {
        SessionAssignment::new(spec, self.interval, &self.venue, self.mode)
    }
}

/// Venues a session may use in `mode`.
pub fn venues_for_mode(spec: &SessionSpec, venues: &[Venue], mode: DeliveryMode) -> Vec<Venue> {
    match mode {
        DeliveryMode::Physical => physical_venues(venues, spec.student_count),
        DeliveryMode::Online => remote_venues(venues),
    }
}

/// Every slot paired with every venue compatible with the session's mode.
pub fn enumerate_candidates(spec: &SessionSpec, slots: &[TimeSlot], venues: &[Venue]) -> Vec<Candidate> {
    let compatible = venues_for_mode(spec, venues, spec.mode);
    slots
        .iter()
        .flat_map(|slot| {
            compatible
                .iter()
                .map(move |venue| Candidate::new(slot, venue.clone(), spec.mode))
        })
        .collect()
}
