//! Integration tests for the bundled tuning loop.
//!
//! These drive `TaskScheduler::tune` through the public API with scripted
//! measurers and candidate sources, and check dispatch order, termination
//! reasons, stop causes, and the final report.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tunetable_sched::{
    Candidate, LocalMeasurer, MeasureHook, MeasureResult, Measurer, SchedulerConfig, StaticSpace,
    StopCause, Target, TaskId, TaskScheduler, TerminationReason, TuneTask,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

fn tasks(budgets: &[u32]) -> Vec<TuneTask> {
    budgets
        .iter()
        .enumerate()
        .map(|(i, &budget)| TuneTask::new(format!("kernel-{i}"), Target::new("llvm"), budget))
        .collect()
}

/// Uniform candidate spaces: `per_task` candidates for each of `task_count`
/// tasks.
fn spaces(task_count: usize, per_task: usize) -> StaticSpace {
    StaticSpace::new(
        (0..task_count)
            .map(|_| (0..per_task).map(|i| json!({ "index": i })).collect())
            .collect(),
    )
}

/// Measurer that records the dispatch order and answers from a script keyed
/// by task id and per-task call number.
struct ScriptedMeasurer {
    served: Mutex<Vec<TaskId>>,
    calls: Mutex<HashMap<TaskId, u64>>,
    script: Box<dyn Fn(TaskId, u64) -> MeasureResult + Send + Sync>,
}

impl ScriptedMeasurer {
    fn new(script: impl Fn(TaskId, u64) -> MeasureResult + Send + Sync + 'static) -> Self {
        Self {
            served: Mutex::new(Vec::new()),
            calls: Mutex::new(HashMap::new()),
            script: Box::new(script),
        }
    }

    fn constant(latency: Duration) -> Self {
        Self::new(move |_, _| MeasureResult::success(latency))
    }

    fn served(&self) -> Vec<TaskId> {
        self.served.lock().unwrap().clone()
    }
}

#[async_trait]
impl Measurer for ScriptedMeasurer {
    async fn measure(
        &self,
        task_id: TaskId,
        _task: &TuneTask,
        _candidate: &Candidate,
    ) -> MeasureResult {
        self.served.lock().unwrap().push(task_id);
        let mut calls = self.calls.lock().unwrap();
        let n = calls.entry(task_id).or_insert(0);
        let result = (self.script)(task_id, *n);
        *n += 1;
        result
    }
}

/// Hook that raises a stop signal after a fixed number of recorded results.
struct StopAfter {
    signal: Arc<AtomicBool>,
    remaining: AtomicU64,
}

impl MeasureHook for StopAfter {
    fn on_result(&self, _task_id: TaskId, _task: &TuneTask, _result: &MeasureResult) {
        if self.remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.signal.store(true, Ordering::Relaxed);
        }
    }
}

#[tokio::test]
async fn unit_budgets_complete_in_one_round_robin_cycle() {
    init_tracing();
    let mut scheduler = TaskScheduler::new(tasks(&[1, 1, 1]), SchedulerConfig::default()).unwrap();
    let mut source = spaces(3, 4);
    let measurer = ScriptedMeasurer::constant(Duration::from_millis(3));

    let report = scheduler.tune(&mut source, &measurer).await.unwrap();

    assert_eq!(measurer.served(), vec![0, 1, 2]);
    assert_eq!(report.stop_cause, StopCause::AllTasksTerminated);
    assert_eq!(report.trials, 3);
    assert!(scheduler.is_terminated());
    for task_id in 0..3 {
        assert_eq!(
            scheduler.record(task_id).unwrap().terminated(),
            Some(TerminationReason::BudgetExhausted)
        );
    }
}

#[tokio::test]
async fn uneven_budgets_keep_serving_the_last_live_task() {
    init_tracing();
    let mut scheduler = TaskScheduler::new(tasks(&[2, 1]), SchedulerConfig::default()).unwrap();
    let mut source = spaces(2, 4);
    let measurer = ScriptedMeasurer::constant(Duration::from_millis(3));

    let report = scheduler.tune(&mut source, &measurer).await.unwrap();

    assert_eq!(measurer.served(), vec![0, 1, 0]);
    assert_eq!(report.stop_cause, StopCause::AllTasksTerminated);
    assert_eq!(report.trials, 3);
}

#[tokio::test]
async fn exhausted_candidate_space_terminates_only_that_task() {
    init_tracing();
    let mut scheduler = TaskScheduler::new(tasks(&[4, 2]), SchedulerConfig::default()).unwrap();
    // Task 0 has a single candidate, task 1 enough for its budget.
    let mut source = StaticSpace::new(vec![
        vec![json!({"tile": 4})],
        vec![json!({"unroll": 1}), json!({"unroll": 4})],
    ]);
    let measurer = ScriptedMeasurer::constant(Duration::from_millis(3));

    let report = scheduler.tune(&mut source, &measurer).await.unwrap();

    assert_eq!(measurer.served(), vec![0, 1, 1]);
    assert_eq!(report.stop_cause, StopCause::AllTasksTerminated);
    assert_eq!(
        scheduler.record(0).unwrap().terminated(),
        Some(TerminationReason::SearchSpaceExhausted)
    );
    assert_eq!(scheduler.record(0).unwrap().trials_used(), 1);
    assert_eq!(
        scheduler.record(1).unwrap().terminated(),
        Some(TerminationReason::BudgetExhausted)
    );
}

#[tokio::test]
async fn global_budget_stops_the_loop_with_tasks_still_live() {
    init_tracing();
    let config = SchedulerConfig {
        max_trials_global: 4,
        ..SchedulerConfig::default()
    };
    let mut scheduler = TaskScheduler::new(tasks(&[10, 10]), config).unwrap();
    let mut source = spaces(2, 16);
    let measurer = ScriptedMeasurer::constant(Duration::from_millis(3));

    let report = scheduler.tune(&mut source, &measurer).await.unwrap();

    assert_eq!(measurer.served(), vec![0, 1, 0, 1]);
    assert_eq!(report.stop_cause, StopCause::GlobalBudgetExhausted);
    assert_eq!(report.trials, 4);
    assert!(!scheduler.is_terminated());
    assert!(scheduler.record(0).unwrap().terminated().is_none());
}

#[tokio::test]
async fn stop_signal_ends_the_run_between_trials() {
    init_tracing();
    let mut scheduler = TaskScheduler::new(tasks(&[10, 10]), SchedulerConfig::default()).unwrap();
    scheduler.add_hook(Arc::new(StopAfter {
        signal: scheduler.stop_signal(),
        remaining: AtomicU64::new(3),
    }));
    let mut source = spaces(2, 16);
    let measurer = Arc::new(ScriptedMeasurer::constant(Duration::from_millis(3)));

    let report = scheduler.tune(&mut source, &measurer).await.unwrap();

    assert_eq!(measurer.served(), vec![0, 1, 0]);
    assert_eq!(report.stop_cause, StopCause::Stopped);
    assert_eq!(report.trials, 3);
    assert!(!scheduler.is_terminated());
}

#[tokio::test]
async fn second_run_resumes_where_the_first_stopped() {
    init_tracing();
    let mut scheduler = TaskScheduler::new(tasks(&[2, 1]), SchedulerConfig::default()).unwrap();
    scheduler.add_hook(Arc::new(StopAfter {
        signal: scheduler.stop_signal(),
        remaining: AtomicU64::new(1),
    }));
    let mut source = spaces(2, 4);
    let measurer = ScriptedMeasurer::constant(Duration::from_millis(3));

    let first = scheduler.tune(&mut source, &measurer).await.unwrap();
    assert_eq!(first.stop_cause, StopCause::Stopped);
    assert_eq!(first.trials, 1);

    scheduler.stop_signal().store(false, Ordering::Relaxed);
    let second = scheduler.tune(&mut source, &measurer).await.unwrap();

    assert_eq!(second.stop_cause, StopCause::AllTasksTerminated);
    assert_eq!(second.trials, 2);
    assert_eq!(measurer.served(), vec![0, 1, 0]);
    assert!(scheduler.is_terminated());
}

#[tokio::test]
async fn trials_per_iter_batches_consecutive_trials_for_one_task() {
    init_tracing();
    let config = SchedulerConfig {
        trials_per_iter: 2,
        ..SchedulerConfig::default()
    };
    let mut scheduler = TaskScheduler::new(tasks(&[4, 2]), config).unwrap();
    let mut source = spaces(2, 8);
    let measurer = ScriptedMeasurer::constant(Duration::from_millis(3));

    let report = scheduler.tune(&mut source, &measurer).await.unwrap();

    assert_eq!(measurer.served(), vec![0, 0, 1, 1, 0, 0]);
    assert_eq!(report.stop_cause, StopCause::AllTasksTerminated);
    assert_eq!(report.trials, 6);
}

#[tokio::test]
async fn failed_measurements_consume_budget_and_are_counted() {
    init_tracing();
    let mut scheduler = TaskScheduler::new(tasks(&[2, 2]), SchedulerConfig::default()).unwrap();
    let mut source = spaces(2, 4);
    let measurer = ScriptedMeasurer::new(|task_id, _| {
        if task_id == 0 {
            MeasureResult::run_error("illegal memory access")
        } else {
            MeasureResult::success(Duration::from_millis(5))
        }
    });

    let report = scheduler.tune(&mut source, &measurer).await.unwrap();

    assert_eq!(report.stop_cause, StopCause::AllTasksTerminated);
    assert_eq!(report.stats.total_failures, 2);
    assert_eq!(report.stats.tasks[0].failures, 2);
    assert_eq!(report.stats.tasks[0].best_latency, None);
    assert_eq!(report.stats.tasks[1].failures, 0);
    assert_eq!(
        report.stats.tasks[1].best_latency,
        Some(Duration::from_millis(5))
    );
}

#[tokio::test]
async fn report_serializes_and_renders_a_row_per_task() {
    init_tracing();
    let mut scheduler = TaskScheduler::new(
        vec![
            TuneTask::new("matmul", Target::new("llvm"), 1).with_flop(2.0e9),
            TuneTask::new("conv2d", Target::new("llvm"), 1),
        ],
        SchedulerConfig::default(),
    )
    .unwrap();
    let mut source = spaces(2, 2);
    let measurer = ScriptedMeasurer::constant(Duration::from_millis(2));

    let report = scheduler.tune(&mut source, &measurer).await.unwrap();
    assert_eq!(report.trials, report.stats.total_trials);

    let rendered = report.stats.to_string();
    assert!(rendered.contains("matmul"));
    assert!(rendered.contains("conv2d"));
    assert!(rendered.contains("budget exhausted"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stop_cause"], json!("all_tasks_terminated"));
    assert_eq!(json["trials"], json!(2));
}

#[tokio::test]
async fn local_measurer_drives_the_loop_end_to_end() {
    init_tracing();
    let mut scheduler = TaskScheduler::new(tasks(&[2, 2]), SchedulerConfig::default()).unwrap();
    let mut source = spaces(2, 4);
    // Latency derived from the candidate, so the best is deterministic.
    let measurer = LocalMeasurer::new(|_, candidate| {
        MeasureResult::success(Duration::from_micros(500 - 100 * candidate.seq))
    })
    .with_time_limit(Duration::from_secs(1));

    let report = scheduler.tune(&mut source, &measurer).await.unwrap();

    assert_eq!(report.stop_cause, StopCause::AllTasksTerminated);
    assert_eq!(report.trials, 4);
    assert_eq!(
        scheduler.record(0).unwrap().best_latency(),
        Some(Duration::from_micros(400))
    );
}
