//! Day and time interval models.
//!
//! Defines the weekly time grid that every session is placed on.
//!
//! # Time Model
//! Times are minutes since midnight (`0..=1440`). Intervals are half-open
//! `[start, end)` and scoped to a single [`Day`]. Two intervals on different
//! days never overlap.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minutes in one day; the exclusive upper bound for interval ends.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Day of the teaching week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days in week order.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Monday through Friday.
    pub const WEEKDAYS: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        };
        f.write_str(name)
    }
}

/// A time interval `[start_min, end_min)` on a given day.
///
/// Value type: two intervals are equal iff day, start and end match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    /// Day of the week.
    pub day: Day,
    /// Interval start (minutes since midnight, inclusive).
    pub start_min: u32,
    /// Interval end (minutes since midnight, exclusive).
    pub end_min: u32,
}

impl TimeInterval {
    /// Creates a new interval.
    pub fn new(day: Day, start_min: u32, end_min: u32) -> Self {
        Self {
            day,
            start_min,
            end_min,
        }
    }

    /// Creates an interval from whole hours (e.g. `hours(Day::Monday, 8, 10)`).
    pub fn hours(day: Day, start_hour: u32, end_hour: u32) -> Self {
        Self::new(day, start_hour * 60, end_hour * 60)
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_min(&self) -> u32 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// Duration in hours (fractional).
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        self.duration_min() as f64 / 60.0
    }

    /// Whether the interval is well-formed (`start < end <= 24h`).
    pub fn is_valid(&self) -> bool {
        self.start_min < self.end_min && self.end_min <= MINUTES_PER_DAY
    }

    /// Whether two intervals overlap.
    ///
    /// Same day and `a.start < b.end && b.start < a.end`. Touching
    /// intervals (`a.end == b.start`) do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day
            && self.start_min < other.end_min
            && other.start_min < self.end_min
    }

    /// Whether one interval ends exactly where the other starts (same day).
    #[inline]
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.day == other.day
            && (self.end_min == other.start_min || other.end_min == self.start_min)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}-{:02}:{:02}",
            self.day,
            self.start_min / 60,
            self.start_min % 60,
            self.end_min / 60,
            self.end_min % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_same_day() {
        let a = TimeInterval::hours(Day::Monday, 8, 10);
        let b = TimeInterval::hours(Day::Monday, 9, 11);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = TimeInterval::hours(Day::Monday, 8, 10);
        let b = TimeInterval::hours(Day::Monday, 10, 12);
        assert!(!a.overlaps(&b));
        assert!(a.is_adjacent(&b));
        assert!(b.is_adjacent(&a));
    }

    #[test]
    fn test_different_days_never_overlap() {
        let a = TimeInterval::hours(Day::Monday, 8, 10);
        let b = TimeInterval::hours(Day::Tuesday, 8, 10);
        assert!(!a.overlaps(&b));
        assert!(!a.is_adjacent(&b));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = TimeInterval::hours(Day::Friday, 8, 12);
        let inner = TimeInterval::new(Day::Friday, 9 * 60, 9 * 60 + 30);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_duration_and_validity() {
        let a = TimeInterval::new(Day::Monday, 480, 570);
        assert_eq!(a.duration_min(), 90);
        assert!((a.duration_hours() - 1.5).abs() < 1e-10);
        assert!(a.is_valid());

        assert!(!TimeInterval::new(Day::Monday, 600, 600).is_valid());
        assert!(!TimeInterval::new(Day::Monday, 600, 500).is_valid());
        assert!(!TimeInterval::new(Day::Monday, 1400, 1500).is_valid());
    }

    #[test]
    fn test_display() {
        let a = TimeInterval::new(Day::Wednesday, 8 * 60 + 5, 10 * 60);
        assert_eq!(a.to_string(), "Wednesday 08:05-10:00");
    }

    #[test]
    fn test_day_ordering() {
        assert!(Day::Monday < Day::Friday);
        assert_eq!(Day::ALL.len(), 7);
        assert_eq!(Day::WEEKDAYS[4], Day::Friday);
    }
}
