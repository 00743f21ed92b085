//! Task and workflow identifiers, task configuration, and attached files.

use std::str::FromStr;

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::draft::Position;
use super::service::ServiceId;

/// Unique identifier for a persisted task.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task ID.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a task ID from an existing UUID.
    #[inline]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[inline]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

/// Unique identifier for a workflow.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct WorkflowId(Uuid);

impl WorkflowId {
    /// Creates a new random workflow ID.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a workflow ID from an existing UUID.
    #[inline]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[inline]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for WorkflowId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Service-specific task configuration.
///
/// Configuration is an opaque key-value structure resolved at execution
/// time. A string value may contain `{{selector}}` placeholders referencing
/// outputs collected from already-completed tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskConfig(Map<String, Value>);

impl TaskConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a configuration field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns a field value, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a field as a string slice, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns an iterator over all fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns whether the configuration has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying JSON map.
    pub fn inner(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for TaskConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A file attached to a task, addressable from dependent configurations
/// through the `files.<id>` output selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFile {
    /// Stable file identifier.
    pub id: String,
    /// Resolved URL of the file contents.
    pub url: String,
}

impl TaskFile {
    /// Creates a new task file.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Returns the output selector key for this file.
    pub fn selector(&self) -> String {
        format!("files.{}", self.id)
    }
}

/// A persisted workflow task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Persistent task identifier.
    pub id: TaskId,
    /// Client temp ID from the revision this task was saved in; used to
    /// keep task identity stable across saves.
    pub temp_id: String,
    /// Service this task invokes.
    pub service_id: ServiceId,
    /// Placement in the editor canvas.
    #[serde(default)]
    pub position: Position,
    /// Service-specific configuration; `None` until the user fills it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<TaskConfig>,
    /// Files attached to this task.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<TaskFile>,
}

impl Task {
    /// Creates a new task with a fresh persistent ID.
    pub fn new(temp_id: impl Into<String>, service_id: ServiceId) -> Self {
        Self {
            id: TaskId::new(),
            temp_id: temp_id.into(),
            service_id,
            position: Position::default(),
            config: None,
            files: Vec::new(),
        }
    }

    /// Sets the task configuration.
    pub fn with_config(mut self, config: TaskConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Attaches a file to the task.
    pub fn with_file(mut self, file: TaskFile) -> Self {
        self.files.push(file);
        self
    }
}
