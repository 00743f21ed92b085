//! Convenience re-exports of the crate's common surface.

pub use crate::engine::{
    ActionInput, ActionKind, ActionOutput, ActionRegistry, ActionRunner, Connection,
    ConnectionRegistry, Engine, EngineConfig, ExecutionReport, FailurePolicy, PlaceholderPolicy,
    TaskReport, TaskStatus,
};
pub use crate::error::{WorkflowError, WorkflowResult};
pub use crate::graph::{
    DependencyDraft, GraphValidator, Position, Service, ServiceId, ServiceKind, ServiceRegistry,
    Task, TaskConfig, TaskDraft, TaskFile, TaskId, ValidationError, WorkflowDraft, WorkflowGraph,
    WorkflowId,
};
pub use crate::runtime::{MemoryWorkflowStore, WorkflowService, WorkflowStore};
