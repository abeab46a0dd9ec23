//! Session model.
//!
//! A session is one weekly meeting of a unit for a class/group. Sessions
//! are derived from a unit's credit hours by the decomposer and are the
//! smallest schedulable item: each receives exactly one placement.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ResourceKey;

/// Teaching mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// In a physical room; needs seats for every student.
    Physical,
    /// Online; placed in a remote venue.
    Online,
}

impl DeliveryMode {
    /// The other mode.
    pub fn flipped(self) -> Self {
        match self {
            DeliveryMode::Physical => DeliveryMode::Online,
            DeliveryMode::Online => DeliveryMode::Physical,
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Physical => f.write_str("physical"),
            DeliveryMode::Online => f.write_str("online"),
        }
    }
}

/// Identifies a session within a scheduling request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionRef {
    /// Unit the session belongs to.
    pub unit_id: String,
    /// Semester label.
    pub semester: String,
    /// Class identifier.
    pub class_id: String,
    /// Optional student group.
    pub group_id: Option<String>,
    /// Position in the unit's decomposition (0-indexed).
    pub index: u32,
}

impl fmt::Display for SessionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.unit_id, self.semester, self.class_id)?;
        if let Some(group) = &self.group_id {
            write!(f, "/{group}")?;
        }
        write!(f, "#{}", self.index)
    }
}

/// An immutable request to place one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSpec {
    /// Unique reference.
    pub session_ref: SessionRef,
    /// Lecturer identifier.
    pub lecturer: String,
    /// Number of attending students.
    pub student_count: u32,
    /// Required length in minutes.
    pub required_duration_min: u32,
    /// Requested delivery mode.
    pub mode: DeliveryMode,
}

impl SessionSpec {
    /// Creates a session spec with an explicit reference.
    pub fn new(
        session_ref: SessionRef,
        lecturer: impl Into<String>,
        student_count: u32,
        required_duration_min: u32,
        mode: DeliveryMode,
    ) -> Self {
        Self {
            session_ref,
            lecturer: lecturer.into(),
            student_count,
            required_duration_min,
            mode,
        }
    }

    /// Shorthand used mostly in tests: a session for `unit`/`class`
    /// taught by `lecturer`, `hours` long.
    pub fn simple(
        unit_id: impl Into<String>,
        class_id: impl Into<String>,
        lecturer: impl Into<String>,
        hours: u32,
        mode: DeliveryMode,
    ) -> Self {
        let session_ref = SessionRef {
            unit_id: unit_id.into(),
            semester: String::new(),
            class_id: class_id.into(),
            group_id: None,
            index: 0,
        };
        Self::new(session_ref, lecturer, 30, hours * 60, mode)
    }

    /// Sets the student group.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.session_ref.group_id = Some(group_id.into());
        self
    }

    /// Sets the decomposition index.
    pub fn with_index(mut self, index: u32) -> Self {
        self.session_ref.index = index;
        self
    }

    /// Sets the number of students.
    pub fn with_students(mut self, student_count: u32) -> Self {
        self.student_count = student_count;
        self
    }

    /// Unit identifier.
    pub fn unit_id(&self) -> &str {
        &self.session_ref.unit_id
    }

    /// Group identifier, if any.
    pub fn group_id(&self) -> Option<&str> {
        self.session_ref.group_id.as_deref()
    }

    /// Class identifier.
    pub fn class_id(&self) -> &str {
        &self.session_ref.class_id
    }

    /// Required length in hours (fractional).
    pub fn required_hours(&self) -> f64 {
        self.required_duration_min as f64 / 60.0
    }

    /// Ledger key of the lecturer.
    pub fn lecturer_key(&self) -> ResourceKey {
        ResourceKey::Lecturer(self.lecturer.clone())
    }

    /// Ledger key of the group, if any.
    pub fn group_key(&self) -> Option<ResourceKey> {
        self.session_ref.group_id.clone().map(ResourceKey::Group)
    }

    /// Ledger key of the class.
    pub fn class_key(&self) -> ResourceKey {
        ResourceKey::Class(self.session_ref.class_id.clone())
    }

    /// Key used for per-(group, day) soft statistics: the group when
    /// present, otherwise the class.
    pub fn cohort_key(&self) -> ResourceKey {
        self.group_key().unwrap_or_else(|| self.class_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ref_display() {
        let spec = SessionSpec::simple("U1", "CS-1A", "L1", 2, DeliveryMode::Physical)
            .with_group("G1")
            .with_index(1);
        assert_eq!(spec.session_ref.to_string(), "U1//CS-1A/G1#1");
    }

    #[test]
    fn test_keys() {
        let spec = SessionSpec::simple("U1", "C1", "L1", 1, DeliveryMode::Online);
        assert_eq!(spec.lecturer_key(), ResourceKey::lecturer("L1"));
        assert!(spec.group_key().is_none());
        assert_eq!(spec.cohort_key(), ResourceKey::class("C1"));

        let grouped = spec.with_group("G9");
        assert_eq!(grouped.cohort_key(), ResourceKey::group("G9"));
    }

    #[test]
    fn test_required_hours() {
        let spec = SessionSpec::simple("U1", "C1", "L1", 2, DeliveryMode::Physical);
        assert_eq!(spec.required_duration_min, 120);
        assert!((spec.required_hours() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_mode_flip() {
        assert_eq!(DeliveryMode::Physical.flipped(), DeliveryMode::Online);
        assert_eq!(DeliveryMode::Online.flipped(), DeliveryMode::Physical);
        assert_eq!(DeliveryMode::Online.to_string(), "online");
    }
}
