//! Job tracking for fire-and-forget command invocations.
//!
//! This module provides:
//! - The job record and its state transitions
//! - `JobRegistry`, the process-lifetime store queried by polling clients

pub mod job;
pub mod registry;

pub use job::Job;
pub use registry::JobRegistry;
