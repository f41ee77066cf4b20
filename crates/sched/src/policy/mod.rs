//! Scheduling policies.
//!
//! A policy decides which live task receives the next trial. Policies only
//! read task records; all mutation of trial accounting stays in the
//! scheduler. `build` maps a configured [`PolicyKind`] to its
//! implementation.

mod gradient;
mod round_robin;

pub use gradient::GradientPolicy;
pub use round_robin::RoundRobinPolicy;

use tunetable_core::TaskId;

use crate::config::PolicyKind;
use crate::record::TaskRecord;

/// Picks the task that receives the next trial.
pub trait Policy: Send {
    /// Name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Pick an eligible task, advancing any internal cursor. Returns `None`
    /// when no task can take another trial. Implementations must never
    /// return a task that is terminated or whose remaining budget is fully
    /// claimed by outstanding trials.
    fn pick(&mut self, records: &[TaskRecord]) -> Option<TaskId>;
}

pub(crate) fn build(kind: &PolicyKind) -> Box<dyn Policy> {
    match kind {
        PolicyKind::RoundRobin => Box::new(RoundRobinPolicy::new()),
        PolicyKind::Gradient { window, warmup } => {
            Box::new(GradientPolicy::new(*window, *warmup))
        }
    }
}
