//! Client-submitted workflow drafts.
//!
//! A draft is the node/edge set as drawn in the visual editor, identified by
//! client-generated temp IDs. Drafts are validated by
//! [`GraphValidator`](super::GraphValidator) and then converted into a
//! persisted [`WorkflowGraph`](super::WorkflowGraph).

use serde::{Deserialize, Serialize};

use super::service::ServiceId;
use super::task::TaskConfig;

/// Position of a task in the visual editor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A task as submitted by the client, before it has a persistent ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Client-generated identifier, stable within one editing session.
    pub temp_id: String,
    /// Service this task invokes.
    pub service_id: ServiceId,
    /// Placement in the editor canvas.
    #[serde(default)]
    pub position: Position,
    /// Service-specific configuration, if already filled in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<TaskConfig>,
}

impl TaskDraft {
    /// Creates a new draft task.
    pub fn new(temp_id: impl Into<String>, service_id: ServiceId) -> Self {
        Self {
            temp_id: temp_id.into(),
            service_id,
            position: Position::default(),
            config: None,
        }
    }

    /// Sets the editor position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Sets the task configuration.
    pub fn with_config(mut self, config: TaskConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// A directed dependency between two draft tasks.
///
/// `task_temp_id` executes after `depends_on_temp_id` completes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyDraft {
    /// The dependent task.
    pub task_temp_id: String,
    /// The task it waits for.
    pub depends_on_temp_id: String,
}

impl DependencyDraft {
    /// Creates a new dependency draft.
    pub fn new(task: impl Into<String>, depends_on: impl Into<String>) -> Self {
        Self {
            task_temp_id: task.into(),
            depends_on_temp_id: depends_on.into(),
        }
    }
}

/// The full node/edge set for one workflow revision.
///
/// Edges are recreated wholesale on every save; tasks keep their identity
/// across saves through `temp_id` matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDraft {
    /// Tasks in the draft.
    pub tasks: Vec<TaskDraft>,
    /// Dependency edges between tasks.
    #[serde(default)]
    pub dependencies: Vec<DependencyDraft>,
}

impl WorkflowDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task to the draft.
    pub fn add_task(&mut self, task: TaskDraft) -> &mut Self {
        self.tasks.push(task);
        self
    }

    /// Adds a dependency edge to the draft.
    pub fn add_dependency(&mut self, dependency: DependencyDraft) -> &mut Self {
        self.dependencies.push(dependency);
        self
    }

    /// Connects two tasks: `task` will execute after `depends_on`.
    pub fn connect(&mut self, task: impl Into<String>, depends_on: impl Into<String>) -> &mut Self {
        self.dependencies.push(DependencyDraft::new(task, depends_on));
        self
    }

    /// Looks up a draft task by its temp ID.
    pub fn get_task(&self, temp_id: &str) -> Option<&TaskDraft> {
        self.tasks.iter().find(|task| task.temp_id == temp_id)
    }
}
