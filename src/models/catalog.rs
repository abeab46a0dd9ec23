//! Catalog records supplied by the surrounding system.
//!
//! Units, enrollments and time slots are owned and persisted elsewhere;
//! the engine only reads them. Venues live in [`super::resource`].

use serde::{Deserialize, Serialize};

use super::{Day, TimeInterval};

/// A teachable unit (course) and its weekly credit-hour requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique unit identifier.
    pub id: String,
    /// Human-facing course code (e.g. "CS101").
    pub code: String,
    /// Weekly contact hours.
    pub credit_hours: u32,
}

impl Unit {
    /// Creates a new unit.
    pub fn new(id: impl Into<String>, credit_hours: u32) -> Self {
        Self {
            id: id.into(),
            code: String::new(),
            credit_hours,
        }
    }

    /// Sets the course code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

/// Who teaches a unit to whom in a given semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unit being taught.
    pub unit_id: String,
    /// Semester label.
    pub semester: String,
    /// Class (cohort) identifier.
    pub class_id: String,
    /// Optional student group within the class.
    pub group_id: Option<String>,
    /// Lecturer identifier.
    pub lecturer: String,
    /// Number of enrolled students.
    pub student_count: u32,
}

impl Enrollment {
    /// Creates a new enrollment record.
    pub fn new(
        unit_id: impl Into<String>,
        class_id: impl Into<String>,
        lecturer: impl Into<String>,
        student_count: u32,
    ) -> Self {
        Self {
            unit_id: unit_id.into(),
            semester: String::new(),
            class_id: class_id.into(),
            group_id: None,
            lecturer: lecturer.into(),
            student_count,
        }
    }

    /// Sets the semester.
    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = semester.into();
        self
    }

    /// Sets the student group.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }
}

/// A reusable weekly time slot template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Day of the week.
    pub day: Day,
    /// Start (minutes since midnight).
    pub start_min: u32,
    /// End (minutes since midnight, exclusive).
    pub end_min: u32,
}

impl TimeSlot {
    /// Creates a new slot.
    pub fn new(id: impl Into<String>, day: Day, start_min: u32, end_min: u32) -> Self {
        Self {
            id: id.into(),
            day,
            start_min,
            end_min,
        }
    }

    /// Creates a slot from whole hours; the id is derived from day and time.
    pub fn hours(day: Day, start_hour: u32, end_hour: u32) -> Self {
        Self::new(
            format!("{day}-{start_hour:02}-{end_hour:02}"),
            day,
            start_hour * 60,
            end_hour * 60,
        )
    }

    /// The slot's interval.
    #[inline]
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.day, self.start_min, self.end_min)
    }

    /// Slot length in minutes.
    #[inline]
    pub fn duration_min(&self) -> u32 {
        self.end_min.saturating_sub(self.start_min)
    }
}

/// Slots whose length is exactly `duration_min`.
pub fn slots_with_duration(catalog: &[TimeSlot], duration_min: u32) -> Vec<&TimeSlot> {
    catalog
        .iter()
        .filter(|s| s.duration_min() == duration_min)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_builder() {
        let u = Unit::new("U1", 3).with_code("CS101");
        assert_eq!(u.id, "U1");
        assert_eq!(u.code, "CS101");
        assert_eq!(u.credit_hours, 3);
    }

    #[test]
    fn test_enrollment_builder() {
        let e = Enrollment::new("U1", "CS-1A", "L1", 40)
            .with_semester("2026-1")
            .with_group("G2");
        assert_eq!(e.unit_id, "U1");
        assert_eq!(e.semester, "2026-1");
        assert_eq!(e.group_id.as_deref(), Some("G2"));
        assert_eq!(e.student_count, 40);
    }

    #[test]
    fn test_slot_interval() {
        let s = TimeSlot::hours(Day::Tuesday, 8, 10);
        assert_eq!(s.id, "Tuesday-08-10");
        assert_eq!(s.duration_min(), 120);
        assert_eq!(s.interval(), TimeInterval::hours(Day::Tuesday, 8, 10));
    }

    #[test]
    fn test_slots_with_duration() {
        let catalog = vec![
            TimeSlot::hours(Day::Monday, 8, 10),
            TimeSlot::hours(Day::Monday, 10, 11),
            TimeSlot::hours(Day::Tuesday, 8, 10),
        ];
        assert_eq!(slots_with_duration(&catalog, 120).len(), 2);
        assert_eq!(slots_with_duration(&catalog, 60).len(), 1);
        assert!(slots_with_duration(&catalog, 180).is_empty());
    }
}
