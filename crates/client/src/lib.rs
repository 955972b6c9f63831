//! # tfd-client
//!
//! Operator-side state for the dashboard.
//!
//! This crate provides:
//! - [`JobTracker`]: the tracked set of jobs with display indices, focus
//!   and a persisted snapshot that survives restarts
//! - [`JobPoller`] and [`JobSupervisor`]: per-job polling every two seconds
//!   until a terminal status or the first failed read
//! - [`ShellController`]: at most one interactive shell at a time
//! - [`HttpApi`]: the HTTP client, behind the [`DashboardApi`] trait
//!
//! ## Modules
//!
//! - [`api`]: Transport trait and HTTP implementation
//! - [`sse`]: Server-Sent Events decoding for shell streams
//! - [`storage`]: Key-value persistence for snapshots
//! - [`tracker`]: Job tracking state machine
//! - [`poller`]: Polling state machine and refresh hook
//! - [`refresh`]: Deployments and preferences reloaded after jobs finish
//! - [`supervisor`]: Start helpers, rehydration and poll task ownership
//! - [`shell`]: Shell controller

pub mod api;
pub mod error;
pub mod poller;
pub mod refresh;
pub mod shell;
pub mod sse;
pub mod storage;
pub mod supervisor;
pub mod tracker;

pub use api::{DashboardApi, HttpApi, ShellStream};
pub use error::{ClientError, ClientResult};
pub use poller::{JobPoller, NoRefresh, PollState, RefreshHook, SharedTracker, POLL_INTERVAL};
pub use refresh::ServerViews;
pub use shell::{ActiveShell, ShellController};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use supervisor::{JobSupervisor, RehydrateReport};
pub use tracker::{JobDisplay, JobMeta, JobTracker, TrackedJob, RESTORING_LOG, WAITING_LOG};
