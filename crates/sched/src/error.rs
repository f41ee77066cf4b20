use thiserror::Error;

/// Errors surfaced by the scheduler.
///
/// Every variant is either bad construction input or a caller contract
/// violation, and none of them is retryable. Measurement failures are not
/// errors at this level: they arrive as [`MeasureResult`] values, count
/// against the owning task's trial budget, and leave the scheduler in a
/// perfectly good state.
///
/// [`MeasureResult`]: tunetable_core::MeasureResult
#[derive(Debug, Error)]
pub enum SchedError {
    /// Invalid scheduler configuration or task list.
    #[error("config error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// A task id outside `0..task_count` was passed to the scheduler.
    #[error("invalid task id {task_id}: scheduler holds {task_count} tasks")]
    InvalidTaskId { task_id: usize, task_count: usize },

    /// A result was reported for a task with no trial awaiting one.
    #[error("duplicate update for task {task_id}: no outstanding trial")]
    DuplicateUpdate { task_id: usize },
}
