//! Workflow persistence seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::{WorkflowGraph, WorkflowId};

/// Storage backend for persisted workflow graphs.
///
/// The engine never talks to a database directly; the application layer
/// provides an implementation backed by its relational store.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Loads the current revision of a workflow.
    async fn load(&self, id: WorkflowId) -> WorkflowResult<WorkflowGraph>;

    /// Persists a workflow revision, replacing any existing one.
    async fn save(&self, graph: WorkflowGraph) -> WorkflowResult<()>;
}

/// In-memory workflow store for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkflowStore {
    workflows: Arc<RwLock<HashMap<WorkflowId, WorkflowGraph>>>,
}

impl MemoryWorkflowStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored workflows.
    pub async fn len(&self) -> usize {
        self.workflows.read().await.len()
    }

    /// Returns true if the store holds no workflows.
    pub async fn is_empty(&self) -> bool {
        self.workflows.read().await.is_empty()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn load(&self, id: WorkflowId) -> WorkflowResult<WorkflowGraph> {
        self.workflows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(WorkflowError::WorkflowNotFound { workflow_id: id })
    }

    async fn save(&self, graph: WorkflowGraph) -> WorkflowResult<()> {
        self.workflows
            .write()
            .await
            .insert(graph.workflow_id(), graph);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_workflow() {
        let store = MemoryWorkflowStore::new();
        let id = WorkflowId::new();
        let result = store.load(id).await;
        assert!(matches!(
            result,
            Err(WorkflowError::WorkflowNotFound { workflow_id }) if workflow_id == id
        ));
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let store = MemoryWorkflowStore::new();
        let id = WorkflowId::new();
        store.save(WorkflowGraph::new(id)).await.unwrap();

        let loaded = store.load(id).await.unwrap();
        assert_eq!(loaded.workflow_id(), id);
        assert!(loaded.is_empty());
    }
}
