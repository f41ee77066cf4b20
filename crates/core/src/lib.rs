//! Domain types and collaborator traits for the tunetable tuning scheduler.
//!
//! This crate holds the vocabulary shared between the scheduler
//! (`tunetable-sched`) and measurement backends: tasks, candidates, measure
//! results, and the [`Measurer`]/[`CandidateSource`]/[`MeasureHook`] seams.
//! Backends depend on this crate alone.

pub mod measure;
pub mod task;
pub mod traits;

pub use measure::{Candidate, MeasureOutcome, MeasureResult};
pub use task::{Target, TaskId, TerminationReason, TuneTask};
pub use traits::{CandidateSource, MeasureHook, Measurer};
