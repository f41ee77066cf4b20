//! Progress reporting.
//!
//! [`TuningStats`] is a point-in-time snapshot of every task's accounting,
//! printable as an aligned table for logs and terminals. [`TuneReport`] wraps
//! the final snapshot of one tuning run together with its identity and stop
//! cause.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tunetable_core::{TaskId, TerminationReason};
use uuid::Uuid;

use crate::record::TaskRecord;

// ── Stop cause ───────────────────────────────────────────────────────

/// Why a tuning run returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCause {
    /// Every task reached a terminal state.
    AllTasksTerminated,
    /// The configured cross-task trial cap was reached.
    GlobalBudgetExhausted,
    /// The stop signal was raised.
    Stopped,
}

impl fmt::Display for StopCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopCause::AllTasksTerminated => "all tasks terminated",
            StopCause::GlobalBudgetExhausted => "global trial budget exhausted",
            StopCause::Stopped => "stopped",
        };
        f.write_str(text)
    }
}

// ── Per-task stats ───────────────────────────────────────────────────

/// Snapshot of one task's progress.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStats {
    pub task_id: TaskId,
    pub name: String,
    pub weight: f64,
    pub flop: f64,
    pub trials: u32,
    pub failures: u32,
    pub best_latency: Option<Duration>,
    pub mean_latency: Option<Duration>,
    /// Throughput at the best latency, in GFLOPS.
    pub best_gflops: Option<f64>,
    pub terminated: Option<TerminationReason>,
}

impl TaskStats {
    fn from_record(task_id: TaskId, record: &TaskRecord) -> Self {
        let task = record.task();
        let best_gflops = record
            .best_latency()
            .map(|best| task.flop / best.as_secs_f64() / 1e9);
        Self {
            task_id,
            name: task.name.clone(),
            weight: task.weight,
            flop: task.flop,
            trials: record.trials_used(),
            failures: record.failures(),
            best_latency: record.best_latency(),
            mean_latency: record.mean_latency(),
            best_gflops,
            terminated: record.terminated(),
        }
    }
}

// ── Whole-run snapshot ───────────────────────────────────────────────

/// Snapshot of the whole scheduler, one row per task.
#[derive(Debug, Clone, Serialize)]
pub struct TuningStats {
    pub generated_at: DateTime<Utc>,
    pub tasks: Vec<TaskStats>,
    pub total_trials: u64,
    pub total_failures: u64,
    pub tasks_terminated: usize,
}

impl TuningStats {
    pub(crate) fn from_records(records: &[TaskRecord], total_trials: u64) -> Self {
        let tasks: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(task_id, record)| TaskStats::from_record(task_id, record))
            .collect();
        let total_failures = tasks.iter().map(|t| u64::from(t.failures)).sum();
        let tasks_terminated = tasks.iter().filter(|t| t.terminated.is_some()).count();
        Self {
            generated_at: Utc::now(),
            tasks,
            total_trials,
            total_failures,
            tasks_terminated,
        }
    }
}

impl fmt::Display for TuningStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .tasks
            .iter()
            .map(|t| t.name.len())
            .max()
            .unwrap_or(0)
            .max(4);
        writeln!(
            f,
            "{:>4} | {:<name_width$} | {:>6} | {:>9} | {:>6} | {:>6} | {:>9} | {:>9} | {:>8} | terminated",
            "id", "name", "weight", "flop", "trials", "failed", "best(ms)", "mean(ms)", "gflops",
        )?;
        for task in &self.tasks {
            writeln!(
                f,
                "{:>4} | {:<name_width$} | {:>6.2} | {:>9.2e} | {:>6} | {:>6} | {:>9} | {:>9} | {:>8} | {}",
                task.task_id,
                task.name,
                task.weight,
                task.flop,
                task.trials,
                task.failures,
                format_ms(task.best_latency),
                format_ms(task.mean_latency),
                format_gflops(task.best_gflops),
                match task.terminated {
                    Some(reason) => reason.to_string(),
                    None => "-".to_string(),
                },
            )?;
        }
        write!(
            f,
            "total trials: {}, failures: {}, terminated tasks: {}/{}",
            self.total_trials,
            self.total_failures,
            self.tasks_terminated,
            self.tasks.len(),
        )
    }
}

fn format_ms(value: Option<Duration>) -> String {
    match value {
        Some(latency) => format!("{:.3}", latency.as_secs_f64() * 1e3),
        None => "-".to_string(),
    }
}

fn format_gflops(value: Option<f64>) -> String {
    match value {
        Some(gflops) => format!("{gflops:.2}"),
        None => "-".to_string(),
    }
}

// ── Run report ───────────────────────────────────────────────────────

/// Final report for one tuning run.
#[derive(Debug, Clone, Serialize)]
pub struct TuneReport {
    /// Identity of this run, for correlating logs.
    pub run_id: Uuid,
    pub stop_cause: StopCause,
    /// Trials recorded during this run.
    pub trials: u64,
    pub elapsed: Duration,
    pub stats: TuningStats,
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tunetable_core::{MeasureResult, Target, TuneTask};

    fn record(name: &str, max_trials: u32) -> TaskRecord {
        TaskRecord::new(TuneTask::new(name, Target::new("llvm"), max_trials).with_flop(2.0e9))
    }

    #[test]
    fn snapshot_counts_failures_and_terminations() {
        let mut done = record("matmul", 1);
        done.mark_dispatched();
        done.record_result(MeasureResult::success(Duration::from_millis(2)));
        let mut failing = record("conv2d", 4);
        failing.mark_dispatched();
        failing.record_result(MeasureResult::build_error("codegen failed"));

        let stats = TuningStats::from_records(&[done, failing], 2);
        assert_eq!(stats.total_trials, 2);
        assert_eq!(stats.total_failures, 1);
        assert_eq!(stats.tasks_terminated, 1);
        let gflops = stats.tasks[0].best_gflops.unwrap();
        assert!((gflops - 1000.0).abs() < 1e-6);
        assert_eq!(stats.tasks[1].best_latency, None);
    }

    #[test]
    fn table_lists_every_task_with_its_state() {
        let mut done = record("matmul", 1);
        done.mark_dispatched();
        done.record_result(MeasureResult::success(Duration::from_millis(2)));
        let idle = record("conv2d", 4);

        let rendered = TuningStats::from_records(&[done, idle], 1).to_string();
        assert!(rendered.contains("matmul"));
        assert!(rendered.contains("budget exhausted"));
        assert!(rendered.contains("conv2d"));
        assert!(rendered.contains("total trials: 1"));
    }
}
