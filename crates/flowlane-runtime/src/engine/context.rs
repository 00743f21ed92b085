//! Execution context for a single workflow run.

use std::collections::{HashMap, HashSet};

use super::action::ActionOutput;
use super::report::TaskReport;
use crate::graph::TaskId;

/// Ephemeral state for one workflow run.
///
/// Holds the outputs collected from completed tasks (keyed by selector,
/// e.g. `manual.content` or `files.<id>`) and the set of tasks that have
/// finished. Only the coordinating walk mutates this context; concurrent
/// branches receive read-only snapshots and report their deltas back.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    /// Collected outputs, consumed by placeholder resolution in dependents.
    outputs: HashMap<String, String>,
    /// Tasks that have finished during this run.
    completed: HashSet<TaskId>,
    /// Per-task records, in completion order.
    reports: Vec<TaskReport>,
}

impl ExecutionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a single collected output.
    pub fn insert_output(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.outputs.insert(key.into(), value.into());
    }

    /// Merges a completed task's delta into the collected outputs.
    pub fn merge(&mut self, delta: ActionOutput) {
        for (key, value) in delta.values {
            self.outputs.insert(key, value);
        }
        for file in delta.files {
            self.outputs.insert(file.selector(), file.url);
        }
    }

    /// Marks a task as finished.
    pub fn mark_completed(&mut self, task_id: TaskId) {
        self.completed.insert(task_id);
    }

    /// Returns whether a task has finished.
    pub fn is_completed(&self, task_id: TaskId) -> bool {
        self.completed.contains(&task_id)
    }

    /// Appends a per-task record.
    pub fn record(&mut self, report: TaskReport) {
        self.reports.push(report);
    }

    /// Returns a snapshot of the collected outputs for a new branch.
    pub fn snapshot_outputs(&self) -> HashMap<String, String> {
        self.outputs.clone()
    }

    /// Returns the collected outputs.
    pub fn outputs(&self) -> &HashMap<String, String> {
        &self.outputs
    }

    /// Consumes the context into its outputs and task records.
    pub fn into_parts(self) -> (HashMap<String, String>, Vec<TaskReport>) {
        (self.outputs, self.reports)
    }
}
