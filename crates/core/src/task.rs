use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a task within a scheduler's task list.
///
/// Task ids are positions in the ordered task sequence fixed at scheduler
/// construction; they are stable for the lifetime of the scheduler.
pub type TaskId = usize;

/// Opaque description of the environment a task is tuned for.
///
/// The scheduler never inspects the target; it is carried through to the
/// measurer, which knows how to build and run candidates for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a task stopped being scheduled.
///
/// The three triggers are independent; whichever fires first is recorded
/// and kept. A task terminates exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The task consumed its entire trial budget.
    BudgetExhausted,
    /// The task's candidate source ran out of candidates.
    SearchSpaceExhausted,
    /// The caller stopped the task explicitly.
    Stopped,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminationReason::BudgetExhausted => "budget exhausted",
            TerminationReason::SearchSpaceExhausted => "search space exhausted",
            TerminationReason::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// A unit of tunable work with a bounded trial budget.
///
/// Tasks are immutable inputs to the scheduler: runtime state (trials used,
/// results, termination) lives in the scheduler's own records, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuneTask {
    /// Human-readable name for logging and statistics.
    pub name: String,
    /// Environment the task's candidates are measured on.
    pub target: Target,
    /// Maximum number of trials this task may consume. A task with a zero
    /// budget is terminated at scheduler construction and never dispatched.
    pub max_trials: u32,
    /// Relative importance of this task to the overall tuning run. Only the
    /// gradient policy consults it; round-robin ignores weights.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Floating-point operations per run of the tuned workload, used to
    /// report throughput in the tuning statistics. 1.0 when unknown.
    #[serde(default = "default_flop")]
    pub flop: f64,
}

fn default_weight() -> f64 {
    1.0
}

fn default_flop() -> f64 {
    1.0
}

impl TuneTask {
    /// Create a task with default weight and flop count.
    pub fn new(name: impl Into<String>, target: Target, max_trials: u32) -> Self {
        Self {
            name: name.into(),
            target,
            max_trials,
            weight: default_weight(),
            flop: default_flop(),
        }
    }

    /// Set the task weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the flop count per run.
    pub fn with_flop(mut self, flop: f64) -> Self {
        self.flop = flop;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_builder_defaults() {
        let task = TuneTask::new("matmul", Target::new("llvm"), 64);
        assert_eq!(task.name, "matmul");
        assert_eq!(task.target.as_str(), "llvm");
        assert_eq!(task.max_trials, 64);
        assert_eq!(task.weight, 1.0);
        assert_eq!(task.flop, 1.0);
    }

    #[test]
    fn task_builder_overrides() {
        let task = TuneTask::new("conv2d", Target::new("cuda"), 128)
            .with_weight(2.5)
            .with_flop(1.2e9);
        assert_eq!(task.weight, 2.5);
        assert_eq!(task.flop, 1.2e9);
    }

    #[test]
    fn task_serde_defaults_missing_fields() {
        // weight and flop are optional in serialized form
        let task: TuneTask = serde_json::from_str(
            r#"{"name":"relu","target":"llvm -num-cores 4","max_trials":8}"#,
        )
        .unwrap();
        assert_eq!(task.weight, 1.0);
        assert_eq!(task.flop, 1.0);
        assert_eq!(task.target.to_string(), "llvm -num-cores 4");
    }
}
