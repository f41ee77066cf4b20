use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchedError;

/// Scheduling policy, selected at construction time.
///
/// The set of policies is closed: callers pick a variant, they do not
/// register implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Serve live tasks in fixed cyclic order, skipping terminated ones.
    RoundRobin,
    /// Serve the task whose best latency is improving fastest per trial,
    /// scaled by task weight. Tasks with fewer than `warmup` recorded
    /// trials are served first, in list order.
    Gradient {
        /// Number of most recent trials the improvement slope is taken over.
        #[serde(default = "default_gradient_window")]
        window: usize,
        /// Recorded trials a task must have before it competes on gradient.
        #[serde(default = "default_gradient_warmup")]
        warmup: u32,
    },
}

impl Default for PolicyKind {
    fn default() -> Self {
        PolicyKind::RoundRobin
    }
}

fn default_gradient_window() -> usize {
    8
}

fn default_gradient_warmup() -> u32 {
    4
}

/// Scheduler configuration.
///
/// All fields have defaults, so `SchedulerConfig::default()` is a valid
/// round-robin configuration with no global cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Scheduling policy.
    #[serde(default)]
    pub policy: PolicyKind,

    /// Upper bound on trials across all tasks. 0 means unlimited.
    #[serde(default)]
    pub max_trials_global: u64,

    /// Trials measured for a task each time it wins a turn of the loop.
    #[serde(default = "default_trials_per_iter")]
    pub trials_per_iter: u32,
}

fn default_trials_per_iter() -> u32 {
    1
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            max_trials_global: 0,
            trials_per_iter: default_trials_per_iter(),
        }
    }
}

impl SchedulerConfig {
    /// Parse config from a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self, SchedError> {
        let mut config: Self = toml::from_str(raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchedError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&raw)
    }

    // ── Environment variable overrides ──────────────────────────────

    /// Apply environment variable overrides.
    ///
    /// Convention: `TUNETABLE_KEY` overrides `key`:
    /// - `TUNETABLE_MAX_TRIALS_GLOBAL` -> `max_trials_global`
    /// - `TUNETABLE_TRIALS_PER_ITER` -> `trials_per_iter`
    ///
    /// Unparsable values are ignored.
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TUNETABLE_MAX_TRIALS_GLOBAL") {
            if let Ok(n) = v.parse() {
                self.max_trials_global = n;
            }
        }
        if let Ok(v) = std::env::var("TUNETABLE_TRIALS_PER_ITER") {
            if let Ok(n) = v.parse() {
                self.trials_per_iter = n;
            }
        }
    }

    /// Check the configuration for values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.trials_per_iter == 0 {
            return Err(SchedError::Config(
                "trials_per_iter must be at least 1".to_string(),
            ));
        }
        if let PolicyKind::Gradient { window, .. } = self.policy {
            if window == 0 {
                return Err(SchedError::Config(
                    "gradient window must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}
