use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::info;
use tunetable_core::{CandidateSource, Measurer, TaskId, TerminationReason};
use uuid::Uuid;

use super::TaskScheduler;
use crate::error::SchedError;
use crate::metrics::{StopCause, TuneReport};

impl TaskScheduler {
    /// Run the tuning loop until every task is terminated, the global trial
    /// budget is spent, or the stop signal is raised.
    ///
    /// Each turn asks the policy for a task, then draws candidates from
    /// `source` and measures them one at a time, up to `trials_per_iter` per
    /// turn. A task whose source runs dry is terminated with
    /// [`TerminationReason::SearchSpaceExhausted`] and the loop moves on.
    /// Trials are awaited one at a time; the measurer may suspend, but the
    /// scheduler never has two measurements running concurrently.
    pub async fn tune(
        &mut self,
        source: &mut dyn CandidateSource,
        measurer: &dyn Measurer,
    ) -> Result<TuneReport, SchedError> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let trials_before = self.trials_total;
        info!(
            run = %run_id,
            policy = self.policy.name(),
            tasks = self.records.len(),
            "tuning run started"
        );

        let stop_cause = loop {
            if self.stop.load(Ordering::Relaxed) {
                break StopCause::Stopped;
            }
            if self.global_budget_reached() {
                break StopCause::GlobalBudgetExhausted;
            }
            let Some(task_id) = self.next_task_id() else {
                // Every claim is settled within its turn, so a dry pick here
                // means terminated tasks, not in-flight ones.
                break StopCause::AllTasksTerminated;
            };
            self.run_turn(task_id, source, measurer).await?;
        };

        let elapsed = started.elapsed();
        let trials = self.trials_total - trials_before;
        info!(
            run = %run_id,
            cause = %stop_cause,
            trials,
            elapsed_ms = elapsed.as_millis() as u64,
            "tuning run finished"
        );
        Ok(TuneReport {
            run_id,
            stop_cause,
            trials,
            elapsed,
            stats: self.statistics(),
        })
    }

    /// Measure up to `trials_per_iter` candidates for one task. The first
    /// trial of the turn is already claimed by `next_task_id`.
    async fn run_turn(
        &mut self,
        task_id: TaskId,
        source: &mut dyn CandidateSource,
        measurer: &dyn Measurer,
    ) -> Result<(), SchedError> {
        let task = self.records[task_id].task().clone();
        let mut trials_this_turn = 0u32;
        loop {
            let Some(candidate) = source.next_candidate(task_id, &task) else {
                self.records[task_id].cancel_dispatch();
                self.terminate_task(task_id, TerminationReason::SearchSpaceExhausted);
                return Ok(());
            };
            let result = measurer.measure(task_id, &task, &candidate).await;
            self.update(task_id, result)?;
            trials_this_turn += 1;

            if self.records[task_id].is_terminated()
                || trials_this_turn >= self.config.trials_per_iter
                || self.global_budget_reached()
                || self.stop.load(Ordering::Relaxed)
            {
                return Ok(());
            }
            self.records[task_id].mark_dispatched();
        }
    }

    pub(super) fn global_budget_reached(&self) -> bool {
        self.config.max_trials_global > 0 && self.trials_total >= self.config.max_trials_global
    }
}
