use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use tunetable_core::{Candidate, MeasureResult, Measurer, TaskId, TuneTask};

type MeasureFn = dyn Fn(&TuneTask, &Candidate) -> MeasureResult + Send + Sync;

/// In-process measurer running a measurement closure off the async runtime.
///
/// The closure builds and times one candidate and reports the outcome as a
/// [`MeasureResult`]. It runs via [`tokio::task::spawn_blocking`], so a slow
/// build never stalls the scheduler's reactor. With a time limit set, a
/// trial that overruns it is reported as a timeout outcome; the blocking
/// closure itself cannot be cancelled and is left to finish in the
/// background with its result discarded.
pub struct LocalMeasurer {
    measure_fn: Arc<MeasureFn>,
    time_limit: Option<Duration>,
}

impl LocalMeasurer {
    pub fn new(
        measure_fn: impl Fn(&TuneTask, &Candidate) -> MeasureResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            measure_fn: Arc::new(measure_fn),
            time_limit: None,
        }
    }

    /// Cap the wall-clock time of each trial.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

#[async_trait]
impl Measurer for LocalMeasurer {
    async fn measure(
        &self,
        task_id: TaskId,
        task: &TuneTask,
        candidate: &Candidate,
    ) -> MeasureResult {
        let measure_fn = Arc::clone(&self.measure_fn);
        let task = task.clone();
        let candidate = candidate.clone();
        let worker = tokio::task::spawn_blocking(move || measure_fn(&task, &candidate));

        let joined = match self.time_limit {
            Some(limit) => match tokio::time::timeout(limit, worker).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(task_id, limit_ms = limit.as_millis() as u64, "trial timed out");
                    return MeasureResult::timeout(limit);
                }
            },
            None => worker.await,
        };
        match joined {
            Ok(result) => result,
            Err(join_error) => {
                MeasureResult::run_error(format!("measure worker panicked: {join_error}"))
            }
        }
    }
}
