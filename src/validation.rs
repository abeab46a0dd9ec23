//! Input validation for timetabling requests.
//!
//! Checks structural integrity of the slot and venue catalogs and of the
//! session specs before any search runs. Detects:
//! - Duplicate IDs (slot ids, venue names, session refs)
//! - Invalid intervals (end not after start, or past midnight)
//! - Physical venues without seats
//! - Empty catalogs
//! - Sessions with zero duration
//!
//! Every problem is reported, not just the first.

use std::collections::HashSet;

use crate::models::{SessionSpec, TimeSlot, Venue};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same identifier.
    DuplicateId,
    /// A slot's end is not after its start, or lies past midnight.
    InvalidInterval,
    /// A physical venue has no seats.
    InvalidCapacity,
    /// The slot or venue catalog is empty.
    EmptyCatalog,
    /// A session requires zero minutes.
    ZeroDuration,
    /// A seed placement lies outside its session's domain.
    OutOfDomain,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the slot and venue catalogs.
pub fn validate_catalog(slots: &[TimeSlot], venues: &[Venue]) -> ValidationResult {
    let mut errors = Vec::new();

    if slots.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCatalog,
            "Time slot catalog is empty",
        ));
    }
    if venues.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCatalog,
            "Venue catalog is empty",
        ));
    }

    let mut slot_ids = HashSet::new();
    for slot in slots {
        if !slot_ids.insert(slot.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate slot ID: {}", slot.id),
            ));
        }
        if !slot.interval().is_valid() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!(
                    "Slot {} has invalid interval {}..{}",
                    slot.id, slot.start_min, slot.end_min
                ),
            ));
        }
    }

    let mut venue_names = HashSet::new();
    for venue in venues {
        if !venue_names.insert(venue.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate venue name: {}", venue.name),
            ));
        }
        if !venue.is_remote && venue.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!("Venue {} has zero capacity", venue.name),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates session specs.
pub fn validate_sessions(sessions: &[SessionSpec]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut refs = HashSet::new();
    for spec in sessions {
        if !refs.insert(&spec.session_ref) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate session: {}", spec.session_ref),
            ));
        }
        if spec.required_duration_min == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroDuration,
                format!("Session {} has zero duration", spec.session_ref),
            ));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a whole request: catalogs and sessions.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(slots: &[TimeSlot], venues: &[Venue], sessions: &[SessionSpec]) -> ValidationResult {
    let mut errors = validate_catalog(slots, venues).err().unwrap_or_default();
    errors.extend(validate_sessions(sessions).err().unwrap_or_default());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
