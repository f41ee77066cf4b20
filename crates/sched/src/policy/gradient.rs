use tunetable_core::TaskId;

use super::{Policy, RoundRobinPolicy};
use crate::record::TaskRecord;

/// Serve the task whose best latency is dropping fastest.
///
/// Each eligible task is scored as `weight * improvement_per_trial`, where
/// the improvement is taken over a sliding window of the task's best-so-far
/// latency history. Until a task has `warmup` trials recorded or in flight it
/// is served unconditionally, in list order, so every task gets a baseline
/// before gradients are compared. When no task shows improvement the policy
/// degrades to plain rotation.
#[derive(Debug)]
pub struct GradientPolicy {
    window: usize,
    warmup: u32,
    fallback: RoundRobinPolicy,
}

impl GradientPolicy {
    pub fn new(window: usize, warmup: u32) -> Self {
        Self {
            window,
            warmup,
            fallback: RoundRobinPolicy::new(),
        }
    }
}

impl Policy for GradientPolicy {
    fn name(&self) -> &'static str {
        "gradient"
    }

    fn pick(&mut self, records: &[TaskRecord]) -> Option<TaskId> {
        // Warmup counts in-flight trials so concurrent dispatches spread
        // across tasks instead of piling onto the first one.
        for (task_id, record) in records.iter().enumerate() {
            if !record.is_eligible() {
                continue;
            }
            if record.trials_used() + record.outstanding() < self.warmup {
                return Some(task_id);
            }
        }

        let mut best: Option<TaskId> = None;
        let mut top_score = 0.0;
        for (task_id, record) in records.iter().enumerate() {
            if !record.is_eligible() {
                continue;
            }
            let score =
                record.task().weight * improvement_per_trial(record.best_history(), self.window);
            if score > top_score {
                best = Some(task_id);
                top_score = score;
            }
        }

        best.or_else(|| self.fallback.pick(records))
    }
}

/// Mean drop in best latency per trial over the last `window` steps of the
/// history. Zero for histories too short to have a slope.
fn improvement_per_trial(history: &[f64], window: usize) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    let steps = window.min(history.len() - 1);
    let newest = history[history.len() - 1];
    let oldest = history[history.len() - 1 - steps];
    (oldest - newest) / steps as f64
}
