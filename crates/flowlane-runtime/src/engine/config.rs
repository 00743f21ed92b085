//! Engine configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::template::PlaceholderPolicy;

/// Policy applied when a task's action runner fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure, mark the task failed, and keep walking the graph.
    /// Maximizes partial completion of the run.
    #[default]
    BestEffort,
    /// Abort the run on the first failed task.
    FailFast,
}

/// Configuration for the workflow execution engine.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Maximum number of concurrent workflow runs.
    #[builder(default = "10")]
    pub max_concurrent_runs: usize,

    /// What to do when a task's action runner fails.
    #[builder(default)]
    pub failure_policy: FailurePolicy,

    /// How to treat `{{selector}}` placeholders with no collected output.
    #[builder(default)]
    pub placeholder_policy: PlaceholderPolicy,
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(max) = self.max_concurrent_runs {
            if max == 0 {
                return Err("max_concurrent_runs must be at least 1".into());
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: 10,
            failure_policy: FailurePolicy::default(),
            placeholder_policy: PlaceholderPolicy::default(),
        }
    }
}
