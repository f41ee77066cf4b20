use std::collections::VecDeque;

use serde_json::Value;
use tunetable_core::{Candidate, CandidateSource, TaskId, TuneTask};

/// Pre-enumerated candidate spaces, one queue per task id.
///
/// For tests, replays, and dry runs where the search space is known up
/// front. Task ids beyond the configured queues are treated as exhausted.
pub struct StaticSpace {
    queues: Vec<VecDeque<Candidate>>,
}

impl StaticSpace {
    /// One parameter list per task, in task id order. Candidates are
    /// numbered in list order.
    pub fn new(spaces: Vec<Vec<Value>>) -> Self {
        let queues = spaces
            .into_iter()
            .map(|params| {
                params
                    .into_iter()
                    .enumerate()
                    .map(|(seq, value)| Candidate::new(seq as u64, value))
                    .collect()
            })
            .collect();
        Self { queues }
    }

    /// Candidates still queued for a task.
    pub fn remaining(&self, task_id: TaskId) -> usize {
        self.queues.get(task_id).map_or(0, VecDeque::len)
    }
}

impl CandidateSource for StaticSpace {
    fn next_candidate(&mut self, task_id: TaskId, _task: &TuneTask) -> Option<Candidate> {
        self.queues.get_mut(task_id)?.pop_front()
    }
}
