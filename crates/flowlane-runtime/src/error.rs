//! Workflow error types.

use thiserror::Error;

use crate::graph::{TaskId, ValidationError, WorkflowId};

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Submitted graph failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Workflow has no trigger task to start execution from.
    #[error("workflow has no trigger task")]
    NoTriggerTask,

    /// A task's service has no stored connection.
    #[error("no connection for service '{service}': ensure all services are connected")]
    MissingConnection {
        /// Service slug without a connection.
        service: String,
    },

    /// A task has no saved configuration.
    #[error("task {task_id} has no configuration")]
    MissingConfiguration {
        /// ID of the unconfigured task.
        task_id: TaskId,
    },

    /// A task references a (service, method) pair with no registered runner.
    #[error("no action registered for service '{service}' method '{method}'")]
    UnknownAction {
        /// Service slug.
        service: String,
        /// Method name.
        method: String,
    },

    /// A dependency edge references a task missing from the draft.
    #[error("dependency references unknown task '{temp_id}'")]
    UnknownTask {
        /// Temp ID the edge pointed at.
        temp_id: String,
    },

    /// Task execution failed and the failure policy is fail-fast.
    #[error("task {task_id} failed: {message}")]
    TaskFailed {
        /// ID of the failed task.
        task_id: TaskId,
        /// Error message.
        message: String,
    },

    /// A configuration placeholder could not be resolved.
    #[error("unresolved placeholder '{{{{{key}}}}}'")]
    UnresolvedPlaceholder {
        /// Selector key that had no collected output.
        key: String,
    },

    /// No workflow stored under the given ID.
    #[error("workflow {workflow_id} not found")]
    WorkflowNotFound {
        /// Requested workflow ID.
        workflow_id: WorkflowId,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}
