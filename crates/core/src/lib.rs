//! # tfd-core
//!
//! Process orchestration for the TFGrid dashboard.
//!
//! This crate provides:
//! - A process runner that spawns external commands without a shell
//! - The job registry: fire-and-forget processes with accumulated output
//! - The shell session registry: interactive processes with replay and
//!   live fan-out to any number of viewers
//! - Translation of structured command requests into argument vectors
//! - Read-only access to the compose CLI's state files
//! - Configuration loading
//!
//! ## Modules
//!
//! - [`runner`]: Process spawning and output streaming
//! - [`jobs`]: Job records and the job registry
//! - [`shell`]: Shell sessions and the session registry
//! - [`commands`]: Command schema and argument building
//! - [`compose`]: Awaited compose CLI calls (`select`, `address`)
//! - [`store`]: Apps, deployments and preferences
//! - [`config`]: Configuration loading and management

pub mod commands;
pub mod compose;
pub mod config;
pub mod error;
pub mod jobs;
pub mod runner;
pub mod shell;
pub mod store;

pub use error::{ComposeError, RegistryError, StoreError};
