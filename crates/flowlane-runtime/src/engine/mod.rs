//! Workflow execution engine.
//!
//! This module provides the runtime for executing workflows:
//! - [`Engine`]: The main execution engine
//! - [`EngineConfig`]: Configuration options, including failure and
//!   placeholder policies
//! - [`ActionRunner`], [`ActionRegistry`]: Injected per-task side effects
//! - [`Connection`], [`ConnectionRegistry`]: Stored service credentials
//! - [`ExecutionReport`]: Result of a completed run

mod action;
mod config;
mod connection;
mod context;
mod executor;
mod report;
mod template;

pub use action::{ActionInput, ActionKind, ActionOutput, ActionRegistry, ActionRunner};
pub use config::{EngineConfig, EngineConfigBuilder, FailurePolicy};
pub use connection::{Connection, ConnectionRegistry};
pub use context::ExecutionContext;
pub use executor::Engine;
pub use report::{ExecutionReport, TaskReport, TaskStatus};
pub use template::{PlaceholderPolicy, resolve_config, resolve_str};
