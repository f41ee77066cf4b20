use std::time::Duration;

use tunetable_core::{MeasureResult, TerminationReason, TuneTask};

/// Per-task bookkeeping owned by the scheduler.
///
/// A record tracks how many trials a task has consumed, how many results are
/// still outstanding, and the result history the policies score on. Records
/// terminate exactly once; the first cause wins and later causes are ignored.
#[derive(Debug)]
pub struct TaskRecord {
    task: TuneTask,
    trials_used: u32,
    outstanding: u32,
    failures: u32,
    results: Vec<MeasureResult>,
    best_latency: Option<Duration>,
    mean_latency: Option<Duration>,
    /// Best-so-far latency in seconds after each successful trial.
    best_history: Vec<f64>,
    terminated: Option<TerminationReason>,
}

impl TaskRecord {
    /// Wrap a task for scheduling. A task with a zero trial budget is
    /// terminated on the spot and will never be served.
    pub(crate) fn new(task: TuneTask) -> Self {
        let terminated = if task.max_trials == 0 {
            Some(TerminationReason::BudgetExhausted)
        } else {
            None
        };
        Self {
            task,
            trials_used: 0,
            outstanding: 0,
            failures: 0,
            results: Vec::new(),
            best_latency: None,
            mean_latency: None,
            best_history: Vec::new(),
            terminated,
        }
    }

    pub fn task(&self) -> &TuneTask {
        &self.task
    }

    /// Trials with a recorded result.
    pub fn trials_used(&self) -> u32 {
        self.trials_used
    }

    /// Trials handed out whose result has not come back yet.
    pub fn outstanding(&self) -> u32 {
        self.outstanding
    }

    /// Recorded trials that did not produce a latency.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn results(&self) -> &[MeasureResult] {
        &self.results
    }

    /// Lowest latency seen so far, if any trial succeeded.
    pub fn best_latency(&self) -> Option<Duration> {
        self.best_latency
    }

    /// Running mean latency over successful trials.
    pub fn mean_latency(&self) -> Option<Duration> {
        self.mean_latency
    }

    pub fn terminated(&self) -> Option<TerminationReason> {
        self.terminated
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.is_some()
    }

    /// Budget still available, counting outstanding trials as spent.
    pub fn remaining_trials(&self) -> u32 {
        self.task
            .max_trials
            .saturating_sub(self.trials_used)
            .saturating_sub(self.outstanding)
    }

    /// True when the task can take another trial: not terminated, and with
    /// budget left over its outstanding claims.
    pub fn is_eligible(&self) -> bool {
        !self.is_terminated() && self.remaining_trials() > 0
    }

    pub(crate) fn best_history(&self) -> &[f64] {
        &self.best_history
    }

    /// Claim one trial for this task.
    pub(crate) fn mark_dispatched(&mut self) {
        self.outstanding += 1;
    }

    /// Release a claimed trial that will never produce a result.
    pub(crate) fn cancel_dispatch(&mut self) {
        debug_assert!(self.outstanding > 0);
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    /// Record the result of an outstanding trial.
    ///
    /// Returns the termination reason if this result exhausted the task's
    /// budget and the task was not already terminated.
    pub(crate) fn record_result(&mut self, result: MeasureResult) -> Option<TerminationReason> {
        debug_assert!(self.outstanding > 0);
        self.outstanding = self.outstanding.saturating_sub(1);
        self.trials_used += 1;

        match result.latency() {
            Some(latency) => {
                let successes = self.trials_used - self.failures;
                self.mean_latency = Some(incremental_mean(self.mean_latency, latency, successes));
                let best = match self.best_latency {
                    Some(best) if best <= latency => best,
                    _ => latency,
                };
                self.best_latency = Some(best);
                self.best_history.push(best.as_secs_f64());
            }
            None => self.failures += 1,
        }
        self.results.push(result);

        if self.trials_used >= self.task.max_trials
            && self.terminate(TerminationReason::BudgetExhausted)
        {
            return Some(TerminationReason::BudgetExhausted);
        }
        None
    }

    /// Terminate the task. Returns false if it was already terminated.
    pub(crate) fn terminate(&mut self, reason: TerminationReason) -> bool {
        if self.terminated.is_some() {
            return false;
        }
        self.terminated = Some(reason);
        true
    }
}

/// Running mean over `count` samples, with `previous` covering the first
/// `count - 1` of them.
fn incremental_mean(previous: Option<Duration>, sample: Duration, count: u32) -> Duration {
    match previous {
        None => sample,
        Some(mean) => {
            let count = count as f64;
            let updated = mean.as_secs_f64() + (sample.as_secs_f64() - mean.as_secs_f64()) / count;
            Duration::from_secs_f64(updated)
        }
    }
}
