//! Budgeted multi-task tuning scheduler.
//!
//! `tunetable-sched` drives auto-tuning across a batch of compilation tasks
//! competing for trials. A [`TaskScheduler`] owns the task list and all trial
//! accounting; a scheduling policy orders the live tasks; [`Measurer`] and
//! [`CandidateSource`] implementations supply the expensive parts. Callers
//! either step the scheduler manually through [`TaskScheduler::next_task_id`]
//! and [`TaskScheduler::update`], or hand it a measurer and let
//! [`TaskScheduler::tune`] run the loop:
//!
//! ```
//! use std::time::Duration;
//!
//! use serde_json::json;
//! use tunetable_sched::{
//!     LocalMeasurer, MeasureResult, SchedulerConfig, StaticSpace, Target, TaskScheduler,
//!     TuneTask,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tunetable_sched::SchedError> {
//! let tasks = vec![
//!     TuneTask::new("matmul", Target::new("llvm"), 2),
//!     TuneTask::new("conv2d", Target::new("llvm"), 2),
//! ];
//! let mut scheduler = TaskScheduler::new(tasks, SchedulerConfig::default())?;
//!
//! let mut source = StaticSpace::new(vec![
//!     vec![json!({"tile": 4}), json!({"tile": 8})],
//!     vec![json!({"unroll": 1}), json!({"unroll": 4})],
//! ]);
//! let measurer = LocalMeasurer::new(|_, candidate| {
//!     MeasureResult::success(Duration::from_micros(100 + candidate.seq))
//! });
//!
//! let report = scheduler.tune(&mut source, &measurer).await?;
//! println!("{}", report.stats);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod measure;
pub mod metrics;
pub mod policy;
pub mod record;
pub mod runner;

pub use config::{PolicyKind, SchedulerConfig};
pub use error::SchedError;
pub use measure::{LocalMeasurer, StaticSpace};
pub use metrics::{StopCause, TaskStats, TuneReport, TuningStats};
pub use policy::{GradientPolicy, Policy, RoundRobinPolicy};
pub use record::TaskRecord;
pub use runner::TaskScheduler;

// Re-export the shared vocabulary so most callers need a single import.
pub use tunetable_core::{
    Candidate, CandidateSource, MeasureHook, MeasureOutcome, MeasureResult, Measurer, Target,
    TaskId, TerminationReason, TuneTask,
};
