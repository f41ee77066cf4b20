use tunetable_core::TaskId;

use super::Policy;
use crate::record::TaskRecord;

/// Fixed cyclic order over eligible tasks.
///
/// The cursor always sits one past the task served last, so between
/// terminations every eligible task is visited exactly once per cycle no
/// matter how results interleave with picks.
#[derive(Debug, Default)]
pub struct RoundRobinPolicy {
    cursor: usize,
}

impl RoundRobinPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for RoundRobinPolicy {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn pick(&mut self, records: &[TaskRecord]) -> Option<TaskId> {
        let count = records.len();
        for step in 0..count {
            let task_id = (self.cursor + step) % count;
            if records[task_id].is_eligible() {
                self.cursor = (task_id + 1) % count;
                return Some(task_id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunetable_core::{Target, TerminationReason, TuneTask};

    fn records(count: usize) -> Vec<TaskRecord> {
        (0..count)
            .map(|i| TaskRecord::new(TuneTask::new(format!("task-{i}"), Target::new("llvm"), 8)))
            .collect()
    }

    #[test]
    fn cycles_in_list_order() {
        let records = records(3);
        let mut policy = RoundRobinPolicy::new();
        let picks: Vec<_> = (0..6).map(|_| policy.pick(&records).unwrap()).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn skips_terminated_tasks() {
        let mut records = records(3);
        records[1].terminate(TerminationReason::Stopped);
        let mut policy = RoundRobinPolicy::new();
        let picks: Vec<_> = (0..4).map(|_| policy.pick(&records).unwrap()).collect();
        assert_eq!(picks, vec![0, 2, 0, 2]);
    }

    #[test]
    fn resumes_scan_at_cursor_after_termination() {
        let mut records = records(3);
        let mut policy = RoundRobinPolicy::new();
        assert_eq!(policy.pick(&records), Some(0));
        // Cursor now points at task 1; terminating it shifts the pick to 2.
        records[1].terminate(TerminationReason::Stopped);
        assert_eq!(policy.pick(&records), Some(2));
        assert_eq!(policy.pick(&records), Some(0));
    }

    #[test]
    fn skips_fully_claimed_tasks() {
        let mut records = records(3);
        records[0] = TaskRecord::new(TuneTask::new("task-0", Target::new("llvm"), 1));
        records[0].mark_dispatched();
        let mut policy = RoundRobinPolicy::new();
        let picks: Vec<_> = (0..3).map(|_| policy.pick(&records).unwrap()).collect();
        assert_eq!(picks, vec![1, 2, 1]);
    }

    #[test]
    fn none_when_every_live_task_is_fully_claimed() {
        let mut records = records(2);
        for record in &mut records {
            for _ in 0..8 {
                record.mark_dispatched();
            }
        }
        let mut policy = RoundRobinPolicy::new();
        assert_eq!(policy.pick(&records), None);
        records[0].cancel_dispatch();
        assert_eq!(policy.pick(&records), Some(0));
    }

    #[test]
    fn none_when_all_terminated() {
        let mut records = records(2);
        for record in &mut records {
            record.terminate(TerminationReason::BudgetExhausted);
        }
        let mut policy = RoundRobinPolicy::new();
        assert_eq!(policy.pick(&records), None);
    }

    #[test]
    fn single_task_is_served_repeatedly() {
        let records = records(1);
        let mut policy = RoundRobinPolicy::new();
        assert_eq!(policy.pick(&records), Some(0));
        assert_eq!(policy.pick(&records), Some(0));
    }
}
