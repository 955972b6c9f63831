//! Common test utilities for the registry integration tests.
//!
//! This module provides:
//! - Fixtures (runners, registries, mock compose scripts)
//! - Polling assertions for jobs and viewers

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
