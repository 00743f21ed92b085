//! Execution reports.

use std::collections::HashMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::graph::{TaskId, WorkflowId};

/// Final status of one task within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    /// The task's action ran to completion.
    Completed,
    /// The task's action failed; the run continued under best-effort policy.
    Failed,
}

/// Per-task record in an execution report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Task this record describes.
    pub task_id: TaskId,
    /// Final status.
    pub status: TaskStatus,
    /// Error message for failed tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskReport {
    /// Creates a completed-task record.
    pub fn completed(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: TaskStatus::Completed,
            error: None,
        }
    }

    /// Creates a failed-task record.
    pub fn failed(task_id: TaskId, error: impl Into<String>) -> Self {
        Self {
            task_id,
            status: TaskStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Report returned from a completed workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Workflow that ran.
    pub workflow_id: WorkflowId,
    /// Per-task records, in completion order.
    pub tasks: Vec<TaskReport>,
    /// Outputs collected over the whole run, keyed by selector.
    pub outputs: HashMap<String, String>,
    /// When the run started.
    pub started_at: Timestamp,
    /// When the run finished.
    pub finished_at: Timestamp,
}

impl ExecutionReport {
    /// Returns the record for a task, if it ran.
    pub fn task(&self, task_id: TaskId) -> Option<&TaskReport> {
        self.tasks.iter().find(|report| report.task_id == task_id)
    }

    /// Returns the number of tasks that completed.
    pub fn completed_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|report| report.status == TaskStatus::Completed)
            .count()
    }

    /// Returns the number of tasks that failed.
    pub fn failed_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|report| report.status == TaskStatus::Failed)
            .count()
    }
}
