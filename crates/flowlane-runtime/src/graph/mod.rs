//! Workflow graph structures, drafts, and validation.
//!
//! This module provides the graph representation for workflows:
//! - [`WorkflowDraft`]: Client-submitted node/edge set, pre-save
//! - [`GraphValidator`]: Structural validation run before a draft is accepted
//! - [`WorkflowGraph`]: Persisted runtime graph backed by petgraph
//! - [`Task`], [`TaskId`], [`TaskConfig`]: Task types and identifiers
//! - [`Service`], [`ServiceRegistry`]: Integration descriptors
//! - [`DependencyEdge`]: Directed dependency between two tasks

mod draft;
mod service;
mod task;
mod validate;
mod workflow;

pub use draft::{DependencyDraft, Position, TaskDraft, WorkflowDraft};
pub use service::{Service, ServiceId, ServiceKind, ServiceRegistry};
pub use task::{Task, TaskConfig, TaskFile, TaskId, WorkflowId};
pub use validate::{GraphValidator, ValidationError};
pub use workflow::{DependencyEdge, WorkflowGraph};
