//! University class-scheduling engine.
//!
//! Places teaching sessions into (day, time, venue, mode) so that no
//! lecturer, venue or student group is double-booked, and scores the
//! result against daily soft preferences.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeInterval`, `ResourceKey`, `Venue`,
//!   `SessionSpec`, `SessionAssignment`, `ScheduleSolution`
//! - **`decompose`**: Credit hours → ordered session specs
//! - **`ledger`**: Busy-time index per (resource, day)
//! - **`filter`**: Candidate enumeration and the hard/soft filter pipeline
//! - **`scoring`**: Weighted soft-constraint scorer
//! - **`assign`**: Single-session assigner (random / optimized)
//! - **`solver`**: Whole-schedule search: simulated annealing, genetic
//!   algorithm, backtracking
//! - **`commit`**: Store trait, re-check and atomic batch write
//! - **`scheduler`**: Facade and timetable KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, intervals, capacities)
//!
//! # Flows
//!
//! | Path | Steps |
//! |------|-------|
//! | Single-session | decompose → enumerate → filter → score → assign → commit |
//! | Whole-schedule | sessions + committed bookings → solver → commit |
//!
//! The crate emits `tracing` events and never installs a subscriber.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Kirkpatrick et al. (1983), "Optimization by Simulated Annealing"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

pub mod assign;
pub mod commit;
pub mod config;
pub mod decompose;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod models;
pub mod scheduler;
pub mod scoring;
pub mod solver;
pub mod validation;

pub use config::SchedulerConfig;
pub use error::{Result, SchedulingError};
pub use scheduler::{BatchReport, TimetableScheduler, UnitRequest};
