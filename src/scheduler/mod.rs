//! Timetabling facade and KPI evaluation.
//!
//! [`TimetableScheduler`] ties the single-session path (decompose, assign,
//! commit) and the whole-schedule path (solve, commit) to one pair of
//! slot and venue catalogs. [`TimetableKpi`] measures the result.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod kpi;
mod timetable;

pub use kpi::{SoftViolation, SoftViolationKind, TimetableKpi};
pub use timetable::{BatchReport, TimetableScheduler, UnitRequest};
