//! Action dispatch for workflow tasks.
//!
//! Every action task maps to a supported `(service, method)` pair, modeled
//! as the [`ActionKind`] enum. Runners implementing the side effect are
//! injected through the [`ActionRegistry`]; unknown pairs are rejected
//! during execution preflight, never with a mid-run lookup miss.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::connection::Connection;
use crate::error::WorkflowResult;
use crate::graph::{TaskConfig, TaskFile};

/// Supported `(service, method)` action pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    /// `slack` / `post_message`: post a chat message to a channel.
    SlackPostMessage,
    /// `notion` / `append_block`: append a block to a document page.
    NotionAppendBlock,
    /// `drive` / `upload_file`: upload a file to a storage folder.
    DriveUploadFile,
}

impl ActionKind {
    /// Resolves a service slug and method name to a supported action.
    pub fn resolve(service: &str, method: &str) -> Option<Self> {
        match (service, method) {
            ("slack", "post_message") => Some(Self::SlackPostMessage),
            ("notion", "append_block") => Some(Self::NotionAppendBlock),
            ("drive", "upload_file") => Some(Self::DriveUploadFile),
            _ => None,
        }
    }
}

/// Everything a runner needs to perform one task's side effect.
///
/// The configuration arrives with all `{{selector}}` placeholders already
/// resolved; `outputs` is a read-only snapshot of the outputs collected
/// before this task was started.
#[derive(Debug, Clone)]
pub struct ActionInput {
    /// Connection for the task's service.
    pub connection: Connection,
    /// Resolved task configuration.
    pub config: TaskConfig,
    /// Snapshot of outputs collected so far in the run.
    pub outputs: HashMap<String, String>,
    /// Files attached to the task.
    pub files: Vec<TaskFile>,
}

/// Outputs produced by one completed task.
///
/// A branch never writes shared state directly: it returns this delta to
/// the coordinating walk, which merges it before starting dependents.
#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    /// Selector/value pairs to merge into the run's collected outputs.
    pub values: Vec<(String, String)>,
    /// Files produced by the task, exposed as `files.<id>` selectors.
    pub files: Vec<TaskFile>,
}

impl ActionOutput {
    /// Creates an empty output delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a selector/value pair.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push((key.into(), value.into()));
        self
    }

    /// Adds a produced file.
    pub fn with_file(mut self, file: TaskFile) -> Self {
        self.files.push(file);
        self
    }

    /// Returns whether the delta carries nothing.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.files.is_empty()
    }
}

/// A side-effecting integration call executed for one task.
///
/// Implementations live outside this crate (chat, document, storage
/// connectors); the engine only awaits them and merges their deltas.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    /// Performs the side effect for one task.
    async fn run(&self, input: ActionInput) -> WorkflowResult<ActionOutput>;
}

/// Registry binding each supported action to its runner.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    runners: HashMap<ActionKind, Arc<dyn ActionRunner>>,
}

impl ActionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a runner for an action kind.
    pub fn register(&mut self, kind: ActionKind, runner: Arc<dyn ActionRunner>) {
        self.runners.insert(kind, runner);
    }

    /// Retrieves the runner for an action kind.
    pub fn get(&self, kind: ActionKind) -> Option<&Arc<dyn ActionRunner>> {
        self.runners.get(&kind)
    }

    /// Returns whether an action kind has a runner.
    pub fn contains(&self, kind: ActionKind) -> bool {
        self.runners.contains_key(&kind)
    }

    /// Returns the number of registered runners.
    pub fn len(&self) -> usize {
        self.runners.len()
    }

    /// Returns true if no runners are registered.
    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("kinds", &self.runners.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_pairs() {
        assert_eq!(
            ActionKind::resolve("slack", "post_message"),
            Some(ActionKind::SlackPostMessage)
        );
        assert_eq!(
            ActionKind::resolve("notion", "append_block"),
            Some(ActionKind::NotionAppendBlock)
        );
        assert_eq!(
            ActionKind::resolve("drive", "upload_file"),
            Some(ActionKind::DriveUploadFile)
        );
    }

    #[test]
    fn test_resolve_unknown_pair() {
        assert_eq!(ActionKind::resolve("slack", "delete_channel"), None);
        assert_eq!(ActionKind::resolve("jira", "post_message"), None);
    }

    #[test]
    fn test_action_output_builder() {
        let output = ActionOutput::new()
            .with_value("slack.ts", "1724580000.000100")
            .with_file(TaskFile::new("f1", "https://files/f1"));
        assert!(!output.is_empty());
        assert_eq!(output.values.len(), 1);
        assert_eq!(output.files.len(), 1);
    }
}
