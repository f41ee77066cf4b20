use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;
use tunetable_core::{MeasureHook, TaskId, TuneTask};

use crate::config::SchedulerConfig;
use crate::error::SchedError;
use crate::metrics::TuningStats;
use crate::policy::{self, Policy};
use crate::record::TaskRecord;

/// Budgeted multi-task scheduler.
///
/// Owns one [`TaskRecord`] per task plus the policy that orders them. Task
/// ids are list positions, fixed for the scheduler's lifetime. All scheduling
/// state lives behind `&mut self`: callers drive the scheduler from one place
/// at a time, either step-wise through [`next_task_id`] and [`update`] or by
/// handing a measurer to [`tune`]. The stop signal is the one cross-thread
/// surface.
///
/// [`next_task_id`]: TaskScheduler::next_task_id
/// [`update`]: TaskScheduler::update
/// [`tune`]: TaskScheduler::tune
pub struct TaskScheduler {
    pub(super) config: SchedulerConfig,
    pub(super) records: Vec<TaskRecord>,
    pub(super) policy: Box<dyn Policy>,
    pub(super) hooks: Vec<Arc<dyn MeasureHook>>,
    pub(super) stop: Arc<AtomicBool>,
    pub(super) trials_total: u64,
}

impl TaskScheduler {
    /// Build a scheduler over `tasks`.
    ///
    /// Fails on an invalid configuration or an empty task list. Tasks with a
    /// zero trial budget are terminated on the spot and will never be served.
    pub fn new(tasks: Vec<TuneTask>, config: SchedulerConfig) -> Result<Self, SchedError> {
        config.validate()?;
        if tasks.is_empty() {
            return Err(SchedError::Config("task list is empty".to_string()));
        }

        let policy = policy::build(&config.policy);
        let records: Vec<_> = tasks.into_iter().map(TaskRecord::new).collect();
        for (task_id, record) in records.iter().enumerate() {
            if record.is_terminated() {
                info!(
                    task = %record.task().name,
                    task_id,
                    "task has no trial budget, terminated at construction"
                );
            }
        }
        info!(policy = policy.name(), tasks = records.len(), "scheduler ready");

        Ok(Self {
            config,
            records,
            policy,
            hooks: Vec::new(),
            stop: Arc::new(AtomicBool::new(false)),
            trials_total: 0,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn task_count(&self) -> usize {
        self.records.len()
    }

    pub fn task(&self, task_id: TaskId) -> Option<&TuneTask> {
        self.records.get(task_id).map(TaskRecord::task)
    }

    pub fn record(&self, task_id: TaskId) -> Option<&TaskRecord> {
        self.records.get(task_id)
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    /// Trials recorded across all tasks since construction.
    pub fn trials_total(&self) -> u64 {
        self.trials_total
    }

    /// True once every task is terminated.
    pub fn is_terminated(&self) -> bool {
        self.records.iter().all(TaskRecord::is_terminated)
    }

    /// Register an observer for recorded results and task terminations.
    ///
    /// Hooks see everything that happens after registration; terminations
    /// that happened at construction are visible through [`statistics`]
    /// instead.
    ///
    /// [`statistics`]: TaskScheduler::statistics
    pub fn add_hook(&mut self, hook: Arc<dyn MeasureHook>) {
        self.hooks.push(hook);
    }

    /// Snapshot current progress, one row per task.
    pub fn statistics(&self) -> TuningStats {
        TuningStats::from_records(&self.records, self.trials_total)
    }

    /// Handle that makes [`tune`] return after the trial in flight. Safe to
    /// store and flip from another thread or a signal handler.
    ///
    /// [`tune`]: TaskScheduler::tune
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Raise the stop signal.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        info!("stop requested");
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

// The policy and hook objects have no Debug of their own; summarize.
impl fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("policy", &self.policy.name())
            .field("tasks", &self.records.len())
            .field("trials_total", &self.trials_total)
            .finish_non_exhaustive()
    }
}
