use std::sync::Arc;

use async_trait::async_trait;

use crate::measure::{Candidate, MeasureResult};
use crate::task::{TaskId, TerminationReason, TuneTask};

/// Executes one trial: builds and runs a candidate on the task's target.
///
/// Measurement is the expensive, failure-prone edge of the tuning loop. The
/// contract is total: build errors, run errors and timeouts are reported
/// inside the returned [`MeasureResult`], never as a Rust-level error that
/// would abort the loop.
#[async_trait]
pub trait Measurer: Send + Sync {
    /// Measure one candidate for the given task. Blocks (at the await level)
    /// until the trial finishes or the measurer gives up on it.
    async fn measure(
        &self,
        task_id: TaskId,
        task: &TuneTask,
        candidate: &Candidate,
    ) -> MeasureResult;
}

/// Blanket implementation so `Arc<dyn Measurer>` can be used directly.
#[async_trait]
impl<T: Measurer + ?Sized> Measurer for Arc<T> {
    async fn measure(
        &self,
        task_id: TaskId,
        task: &TuneTask,
        candidate: &Candidate,
    ) -> MeasureResult {
        (**self).measure(task_id, task, candidate).await
    }
}

/// Proposes candidates for tasks, one at a time.
///
/// A single source serves every task in a tuning run, keyed by task id, so
/// implementations can hold per-task iterators or delegate to per-task search
/// strategies internally.
pub trait CandidateSource: Send {
    /// Propose the next candidate for the task, or `None` when the task's
    /// search space is exhausted. The scheduler treats `None` as an immediate
    /// termination signal for that task.
    fn next_candidate(&mut self, task_id: TaskId, task: &TuneTask) -> Option<Candidate>;
}

/// Observer notified as the scheduler records trial outcomes.
///
/// Hooks run synchronously on the loop thread after the scheduler's own
/// bookkeeping; they must be cheap. All methods default to no-ops so a hook
/// can implement only what it cares about.
pub trait MeasureHook: Send + Sync {
    /// Called after a result has been recorded against a task.
    fn on_result(&self, _task_id: TaskId, _task: &TuneTask, _result: &MeasureResult) {}

    /// Called once when a task terminates, with the recorded reason.
    fn on_terminated(&self, _task_id: TaskId, _task: &TuneTask, _reason: TerminationReason) {}
}
