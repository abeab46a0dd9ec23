//! Timetabling domain models.
//!
//! Provides the core data types for representing class-scheduling problems
//! and their solutions.
//!
//! # Domain Mappings
//!
//! | u-timetable | Scheduling theory | University |
//! |-------------|-------------------|------------|
//! | SessionSpec | Activity | Lecture / tutorial meeting |
//! | ResourceKey | Disjunctive resource | Lecturer, room, student group |
//! | TimeSlot | Time window | Teaching period |
//! | SessionAssignment | Assignment | Timetable entry |

mod catalog;
mod interval;
mod resource;
mod schedule;
mod session;

pub use catalog::{slots_with_duration, Enrollment, TimeSlot, Unit};
pub use interval::{Day, TimeInterval, MINUTES_PER_DAY};
pub use resource::{physical_venues, remote_venues, ResourceKey, Venue, REMOTE_VENUE_NAME};
pub use schedule::{
    detect_conflicts, Conflict, Placement, ScheduleSolution, SessionAssignment,
};
pub use session::{DeliveryMode, SessionRef, SessionSpec};
