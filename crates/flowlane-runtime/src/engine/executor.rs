//! Workflow execution engine.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::action::{ActionInput, ActionKind, ActionOutput, ActionRegistry, ActionRunner};
use super::config::{EngineConfig, FailurePolicy};
use super::connection::{Connection, ConnectionRegistry};
use super::context::ExecutionContext;
use super::report::{ExecutionReport, TaskReport};
use super::template::{self, PlaceholderPolicy};
use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::{
    GraphValidator, Service, ServiceId, ServiceRegistry, TaskConfig, TaskFile, TaskId,
    ValidationError, WorkflowDraft, WorkflowGraph,
};

/// Tracing target for engine operations.
const TRACING_TARGET: &str = "flowlane_runtime::engine";

/// The workflow execution engine.
///
/// Walks a persisted graph from its trigger in dependency order, fanning
/// out concurrent invocations for sibling dependents. A single coordinating
/// loop owns all run state: branches receive read-only output snapshots and
/// report their deltas back for merging, so no shared mutable state crosses
/// task boundaries.
pub struct Engine {
    config: EngineConfig,
    semaphore: Arc<Semaphore>,
}

impl Engine {
    /// Creates a new engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_runs));

        tracing::info!(
            target: TRACING_TARGET,
            max_concurrent_runs = config.max_concurrent_runs,
            failure_policy = ?config.failure_policy,
            "Workflow engine initialized"
        );

        Self { config, semaphore }
    }

    /// Creates a new engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates a workflow draft before it is persisted.
    pub fn validate(
        &self,
        draft: &WorkflowDraft,
        services: &ServiceRegistry,
    ) -> Result<(), ValidationError> {
        GraphValidator::new().validate(draft, services)
    }

    /// Executes a persisted workflow graph.
    ///
    /// Preconditions are checked before any action runs: the graph must
    /// have a trigger, every action task's service must have a connection
    /// and a registered runner, and every task must be configured. A run
    /// either proceeds past this preflight in full or aborts with zero
    /// side effects.
    pub async fn execute(
        &self,
        workflow: &WorkflowGraph,
        services: &ServiceRegistry,
        connections: &ConnectionRegistry,
        actions: &ActionRegistry,
    ) -> WorkflowResult<ExecutionReport> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| WorkflowError::Internal(format!("semaphore closed: {e}")))?;

        let started_at = Timestamp::now();

        let trigger_id = workflow
            .trigger(services)
            .map(|task| task.id)
            .ok_or(WorkflowError::NoTriggerTask)?;

        let mut prepared = self.preflight(workflow, trigger_id, services, connections, actions)?;

        tracing::debug!(
            target: TRACING_TARGET,
            workflow_id = %workflow.workflow_id(),
            task_count = workflow.task_count(),
            "Starting workflow execution"
        );

        let mut ctx = ExecutionContext::new();
        self.seed_trigger_outputs(workflow, trigger_id, services, &mut ctx);
        ctx.mark_completed(trigger_id);
        ctx.record(TaskReport::completed(trigger_id));

        let mut join_set = JoinSet::new();
        let mut in_flight = HashSet::new();
        self.spawn_ready(
            workflow,
            trigger_id,
            &mut prepared,
            &ctx,
            &mut in_flight,
            &mut join_set,
        );

        while let Some(joined) = join_set.join_next().await {
            let (task_id, result) = joined
                .map_err(|e| WorkflowError::Internal(format!("task panicked or aborted: {e}")))?;

            match result {
                Ok(delta) => {
                    tracing::trace!(
                        target: TRACING_TARGET,
                        task_id = %task_id,
                        output_count = delta.values.len() + delta.files.len(),
                        "Task completed"
                    );
                    ctx.merge(delta);
                    ctx.record(TaskReport::completed(task_id));
                }
                Err(error) => match self.config.failure_policy {
                    FailurePolicy::FailFast => {
                        join_set.abort_all();
                        return Err(WorkflowError::TaskFailed {
                            task_id,
                            message: error.to_string(),
                        });
                    }
                    FailurePolicy::BestEffort => {
                        tracing::warn!(
                            target: TRACING_TARGET,
                            task_id = %task_id,
                            error = %error,
                            "Task failed, continuing walk"
                        );
                        ctx.record(TaskReport::failed(task_id, error.to_string()));
                    }
                },
            }

            in_flight.remove(&task_id);
            ctx.mark_completed(task_id);
            self.spawn_ready(
                workflow,
                task_id,
                &mut prepared,
                &ctx,
                &mut in_flight,
                &mut join_set,
            );
        }

        let (outputs, tasks) = ctx.into_parts();

        tracing::debug!(
            target: TRACING_TARGET,
            workflow_id = %workflow.workflow_id(),
            tasks_run = tasks.len(),
            "Workflow execution completed"
        );

        Ok(ExecutionReport {
            workflow_id: workflow.workflow_id(),
            tasks,
            outputs,
            started_at,
            finished_at: Timestamp::now(),
        })
    }

    /// Checks run preconditions and prepares every action task.
    ///
    /// Check order is deterministic: connections for all tasks, then
    /// configurations, then action dispatch. Nothing side-effecting runs
    /// during preflight.
    fn preflight(
        &self,
        workflow: &WorkflowGraph,
        trigger_id: TaskId,
        services: &ServiceRegistry,
        connections: &ConnectionRegistry,
        actions: &ActionRegistry,
    ) -> WorkflowResult<HashMap<TaskId, PreparedTask>> {
        for task in workflow.tasks() {
            if task.id == trigger_id {
                continue;
            }
            let service = self.service_of(task.service_id, &task.temp_id, services)?;
            connections.get(&service.name)?;
        }

        for task in workflow.tasks() {
            if task.config.is_none() {
                return Err(WorkflowError::MissingConfiguration { task_id: task.id });
            }
        }

        let mut prepared = HashMap::new();
        for task in workflow.tasks() {
            if task.id == trigger_id {
                continue;
            }
            let service = self.service_of(task.service_id, &task.temp_id, services)?;

            let kind = ActionKind::resolve(&service.name, &service.method).ok_or_else(|| {
                WorkflowError::UnknownAction {
                    service: service.name.clone(),
                    method: service.method.clone(),
                }
            })?;
            let runner =
                actions
                    .get(kind)
                    .cloned()
                    .ok_or_else(|| WorkflowError::UnknownAction {
                        service: service.name.clone(),
                        method: service.method.clone(),
                    })?;

            prepared.insert(
                task.id,
                PreparedTask {
                    runner,
                    connection: connections.get(&service.name)?.clone(),
                    config: task.config.clone().unwrap_or_default(),
                    files: task.files.clone(),
                },
            );
        }

        Ok(prepared)
    }

    /// Seeds the run's outputs from the trigger's configuration and files.
    ///
    /// Scalar string configuration values become `<service>.<key>`
    /// selectors; attached files become `files.<id>` selectors.
    fn seed_trigger_outputs(
        &self,
        workflow: &WorkflowGraph,
        trigger_id: TaskId,
        services: &ServiceRegistry,
        ctx: &mut ExecutionContext,
    ) {
        let Some(trigger) = workflow.get_task(trigger_id) else {
            return;
        };
        let Some(service) = services.get(trigger.service_id) else {
            return;
        };

        if let Some(config) = &trigger.config {
            for (key, value) in config.iter() {
                if let Some(text) = value.as_str() {
                    ctx.insert_output(format!("{}.{}", service.name, key), text);
                }
            }
        }

        for file in &trigger.files {
            ctx.insert_output(file.selector(), file.url.clone());
        }
    }

    /// Spawns every not-yet-run dependent of a completed task.
    ///
    /// Each branch gets an owned snapshot of the outputs collected so far;
    /// the completed-set guards against re-running a task reachable twice
    /// if the single-parent invariant was ever bypassed.
    fn spawn_ready(
        &self,
        workflow: &WorkflowGraph,
        parent: TaskId,
        prepared: &mut HashMap<TaskId, PreparedTask>,
        ctx: &ExecutionContext,
        in_flight: &mut HashSet<TaskId>,
        join_set: &mut JoinSet<(TaskId, WorkflowResult<ActionOutput>)>,
    ) {
        for task_id in workflow.dependents(parent) {
            if ctx.is_completed(task_id) || in_flight.contains(&task_id) {
                continue;
            }
            let Some(task) = prepared.remove(&task_id) else {
                continue;
            };

            let outputs = ctx.snapshot_outputs();
            let policy = self.config.placeholder_policy;
            in_flight.insert(task_id);

            tracing::trace!(
                target: TRACING_TARGET,
                task_id = %task_id,
                "Task started"
            );
            join_set.spawn(async move {
                let result = run_prepared(task, outputs, policy).await;
                (task_id, result)
            });
        }
    }

    fn service_of<'a>(
        &self,
        service_id: ServiceId,
        temp_id: &str,
        services: &'a ServiceRegistry,
    ) -> WorkflowResult<&'a Service> {
        services
            .get(service_id)
            .ok_or_else(|| ValidationError::UnknownService {
                temp_id: temp_id.to_string(),
            })
            .map_err(WorkflowError::from)
    }

    /// Returns the number of available run slots.
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Resolves a task's configuration and invokes its runner.
async fn run_prepared(
    task: PreparedTask,
    outputs: HashMap<String, String>,
    policy: PlaceholderPolicy,
) -> WorkflowResult<ActionOutput> {
    let config = template::resolve_config(&task.config, &outputs, policy)?;
    task.runner
        .run(ActionInput {
            connection: task.connection,
            config,
            outputs,
            files: task.files,
        })
        .await
}

/// An action task with everything resolved during preflight.
struct PreparedTask {
    runner: Arc<dyn ActionRunner>,
    connection: Connection,
    config: TaskConfig,
    files: Vec<TaskFile>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("available_slots", &self.available_slots())
            .finish()
    }
}
