//! Pipeline module.
//!
//! This module provides the batch pipeline, the per-file session it drives,
//! and status reporting.

mod builder;
mod session;
pub mod status;

pub use builder::{Pipeline, PipelineBuilder};
pub use session::FileSession;
pub use status::{ClosureStatusReporter, StatusLevel, StatusMessage, StatusReporter};
