use tracing::{debug, info, warn};
use tunetable_core::{MeasureResult, TaskId, TerminationReason};

use super::TaskScheduler;
use crate::error::SchedError;

impl TaskScheduler {
    /// Pick the task that receives the next trial and claim one trial on it.
    ///
    /// Returns `None` when no task can take another trial: every task is
    /// either terminated or has its whole remaining budget claimed by trials
    /// still outstanding. With nothing outstanding that means every task is
    /// terminated. Each returned id must be answered by exactly one
    /// [`update`] call; several trials may be outstanding for the same task
    /// at once, but never more than its remaining budget.
    ///
    /// [`update`]: TaskScheduler::update
    pub fn next_task_id(&mut self) -> Option<TaskId> {
        let picked = self.policy.pick(&self.records);
        if let Some(task_id) = picked {
            let record = &mut self.records[task_id];
            record.mark_dispatched();
            debug!(
                task = %record.task().name,
                task_id,
                outstanding = record.outstanding(),
                "trial dispatched"
            );
        }
        picked
    }

    /// Record the measurement result of an outstanding trial.
    ///
    /// Fails with [`SchedError::InvalidTaskId`] for an id outside the task
    /// list and with [`SchedError::DuplicateUpdate`] when the task has no
    /// trial awaiting a result; the scheduler state is unchanged in both
    /// cases. Failed measurements are recorded like successful ones and
    /// consume budget.
    pub fn update(&mut self, task_id: TaskId, result: MeasureResult) -> Result<(), SchedError> {
        let task_count = self.records.len();
        let Some(record) = self.records.get_mut(task_id) else {
            return Err(SchedError::InvalidTaskId {
                task_id,
                task_count,
            });
        };
        if record.outstanding() == 0 {
            return Err(SchedError::DuplicateUpdate { task_id });
        }

        if !result.is_success() {
            warn!(
                task = %record.task().name,
                task_id,
                outcome = %result.outcome,
                "trial failed"
            );
        }
        let newly_terminated = record.record_result(result.clone());
        self.trials_total += 1;

        let record = &self.records[task_id];
        for hook in &self.hooks {
            hook.on_result(task_id, record.task(), &result);
        }
        if let Some(reason) = newly_terminated {
            info!(
                task = %record.task().name,
                task_id,
                trials = record.trials_used(),
                reason = %reason,
                "task terminated"
            );
            for hook in &self.hooks {
                hook.on_terminated(task_id, record.task(), reason);
            }
        }
        Ok(())
    }

    /// Terminate one task early. Results for its trials still in flight are
    /// accepted afterwards; the task is never served again. Terminating an
    /// already terminated task is a no-op.
    pub fn stop_task(&mut self, task_id: TaskId) -> Result<(), SchedError> {
        if task_id >= self.records.len() {
            return Err(SchedError::InvalidTaskId {
                task_id,
                task_count: self.records.len(),
            });
        }
        self.terminate_task(task_id, TerminationReason::Stopped);
        Ok(())
    }

    /// Mark a task terminated and notify hooks, keeping the first cause if it
    /// already was.
    pub(super) fn terminate_task(&mut self, task_id: TaskId, reason: TerminationReason) {
        if !self.records[task_id].terminate(reason) {
            return;
        }
        let record = &self.records[task_id];
        info!(
            task = %record.task().name,
            task_id,
            trials = record.trials_used(),
            reason = %reason,
            "task terminated"
        );
        for hook in &self.hooks {
            hook.on_terminated(task_id, record.task(), reason);
        }
    }
}
