#![forbid(unsafe_code)]

//! Execution engine for crossdex pipelines.
//!
//! This crate is deliberately tool-agnostic: the compilation-database model and
//! configuration live in `crossdex-core`, and everything external is a child
//! process behind the [`executor::ProcessExecutor`] seam. The `driver` module
//! assembles the concrete extract/index/tables stages on top.

pub mod driver;
pub mod executor;

pub use crate::executor::{Pipeline, PipelineRun, PipelineStatus};
