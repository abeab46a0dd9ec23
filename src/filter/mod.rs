//! Candidate generation and filtering.
//!
//! [`enumerate_candidates`] builds every (slot, venue) option for a session;
//! [`FilterPipeline`] narrows them through ordered hard and soft stages.

mod enumerate;
mod pipeline;

pub use enumerate::{enumerate_candidates, venues_for_mode, Candidate};
pub use pipeline::{FilterContext, FilterOutcome, FilterPipeline, FilterStage, Strictness};
