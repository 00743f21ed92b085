#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod engine;
mod error;
pub mod graph;
pub mod runtime;

#[doc(hidden)]
pub mod prelude;

pub use error::{WorkflowError, WorkflowResult};
pub use graph::ValidationError;

/// Tracing target for runtime operations.
pub const TRACING_TARGET: &str = "flowlane_runtime";
