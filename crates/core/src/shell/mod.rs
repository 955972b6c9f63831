//! Interactive shell sessions with live fan-out to viewers.
//!
//! This module provides:
//! - Line splitting of raw output chunks
//! - `ShellSession`: one subprocess, its replay buffer and attached viewers
//! - `ShellRegistry`: opening, attaching to, writing to and closing sessions

pub mod lines;
pub mod registry;
pub mod session;

pub use registry::{ShellLauncher, ShellRegistry};
pub use session::{ShellSession, Viewer};
