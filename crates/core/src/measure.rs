use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One concrete configuration proposed for a task.
///
/// The scheduler treats the parameter payload as opaque; only the candidate
/// source that produced it and the measurer that executes it interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Position of this candidate within its task's search space (0-based,
    /// in generation order).
    pub seq: u64,
    /// Configuration payload, e.g. a schedule or parameter assignment.
    pub params: serde_json::Value,
}

impl Candidate {
    pub fn new(seq: u64, params: serde_json::Value) -> Self {
        Self { seq, params }
    }
}

/// What happened when a candidate was measured.
///
/// Build and run failures are ordinary outcomes, not errors: they consume a
/// trial and the tuning loop moves on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MeasureOutcome {
    /// The candidate built and ran; `latency` is the measured runtime.
    Success { latency: Duration },
    /// Compiling the candidate failed.
    BuildError { message: String },
    /// The compiled candidate failed at runtime.
    RunError { message: String },
    /// The trial exceeded the measurer's per-trial time limit.
    Timeout { limit: Duration },
}

impl fmt::Display for MeasureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureOutcome::Success { latency } => {
                write!(f, "ok ({:.3} ms)", latency.as_secs_f64() * 1e3)
            }
            MeasureOutcome::BuildError { message } => write!(f, "build error: {message}"),
            MeasureOutcome::RunError { message } => write!(f, "run error: {message}"),
            MeasureOutcome::Timeout { limit } => write!(f, "timeout after {limit:?}"),
        }
    }
}

/// The outcome of one trial, as reported by the measurer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureResult {
    pub outcome: MeasureOutcome,
    /// When the measurement completed.
    pub measured_at: DateTime<Utc>,
}

impl MeasureResult {
    /// A successful measurement with the given runtime.
    pub fn success(latency: Duration) -> Self {
        Self {
            outcome: MeasureOutcome::Success { latency },
            measured_at: Utc::now(),
        }
    }

    /// A failed compilation.
    pub fn build_error(message: impl Into<String>) -> Self {
        Self {
            outcome: MeasureOutcome::BuildError { message: message.into() },
            measured_at: Utc::now(),
        }
    }

    /// A runtime failure of the compiled candidate.
    pub fn run_error(message: impl Into<String>) -> Self {
        Self {
            outcome: MeasureOutcome::RunError { message: message.into() },
            measured_at: Utc::now(),
        }
    }

    /// A trial that hit the measurer's time limit.
    pub fn timeout(limit: Duration) -> Self {
        Self {
            outcome: MeasureOutcome::Timeout { limit },
            measured_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, MeasureOutcome::Success { .. })
    }

    /// The measured runtime, if the trial succeeded.
    pub fn latency(&self) -> Option<Duration> {
        match self.outcome {
            MeasureOutcome::Success { latency } => Some(latency),
            _ => None,
        }
    }
}
