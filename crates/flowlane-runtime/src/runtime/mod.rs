//! Workflow service layer.
//!
//! Binds a [`WorkflowStore`] to the execution [`Engine`](crate::engine::Engine)
//! and handles the two request kinds the application layer issues:
//! saving a draft revision and running a persisted workflow.

mod service;
mod store;

pub use service::WorkflowService;
pub use store::{MemoryWorkflowStore, WorkflowStore};
