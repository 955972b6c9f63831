//! # tfd-protocol
//!
//! Wire and data models shared by the tfgrid dashboard server and its
//! clients.
//!
//! ## Modules
//!
//! - [`job_models`]: Job status and immutable job snapshots
//! - [`shell_models`]: Shell session requests and stream messages
//! - [`command_models`]: CLI command schema and structured start requests
//! - [`deployment_models`]: Read-only app/deployment/preferences views
//! - [`snapshot_models`]: Client-side persisted job snapshot
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, uuid and chrono
//! - TypeScript generation: all types derive `TS` for the browser client
//! - Independent compilation: no dependencies on other dashboard crates

pub mod command_models;
pub mod deployment_models;
pub mod job_models;
pub mod shell_models;
pub mod snapshot_models;

pub use command_models::*;
pub use deployment_models::*;
pub use job_models::*;
pub use shell_models::*;
pub use snapshot_models::*;
