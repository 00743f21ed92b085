//! Workflow service binding storage to the execution engine.

use std::sync::Arc;

use super::store::WorkflowStore;
use crate::engine::{ActionRegistry, ConnectionRegistry, Engine, ExecutionReport};
use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::{ServiceRegistry, WorkflowDraft, WorkflowGraph, WorkflowId};

/// Tracing target for service operations.
const TRACING_TARGET: &str = "flowlane_runtime::service";

/// Service handling workflow save and run requests.
///
/// On save, the draft is validated and converted into a persisted graph,
/// keeping task identity stable across revisions. On run, the persisted
/// graph is loaded and handed to the engine.
pub struct WorkflowService {
    store: Arc<dyn WorkflowStore>,
    engine: Engine,
    services: ServiceRegistry,
    connections: ConnectionRegistry,
    actions: ActionRegistry,
}

impl WorkflowService {
    /// Creates a new workflow service.
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        engine: Engine,
        services: ServiceRegistry,
        connections: ConnectionRegistry,
        actions: ActionRegistry,
    ) -> Self {
        Self {
            store,
            engine,
            services,
            connections,
            actions,
        }
    }

    /// Returns the service registry.
    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Returns the connection registry.
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    /// Validates and persists a draft as the workflow's current revision.
    ///
    /// Existing edges are replaced wholesale; tasks from the prior revision
    /// keep their persistent IDs when their `temp_id` matches. Nothing is
    /// persisted if validation fails.
    pub async fn save_workflow(
        &self,
        id: WorkflowId,
        draft: &WorkflowDraft,
    ) -> WorkflowResult<WorkflowGraph> {
        self.engine.validate(draft, &self.services)?;

        let prior = match self.store.load(id).await {
            Ok(graph) => Some(graph),
            Err(WorkflowError::WorkflowNotFound { .. }) => None,
            Err(other) => return Err(other),
        };

        let graph = WorkflowGraph::from_draft(id, draft, prior.as_ref())?;
        self.store.save(graph.clone()).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            workflow_id = %id,
            task_count = graph.task_count(),
            dependency_count = graph.dependency_count(),
            "Workflow revision saved"
        );

        Ok(graph)
    }

    /// Loads and executes a persisted workflow.
    pub async fn run_workflow(&self, id: WorkflowId) -> WorkflowResult<ExecutionReport> {
        let graph = self.store.load(id).await?;
        self.engine
            .execute(&graph, &self.services, &self.connections, &self.actions)
            .await
    }
}

impl std::fmt::Debug for WorkflowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowService")
            .field("engine", &self.engine)
            .field("services", &self.services.len())
            .field("connections", &self.connections.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}
