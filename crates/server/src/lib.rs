//! # tfd-server
//!
//! HTTP transport for the dashboard.
//!
//! Jobs are pull-based: a start request returns `202` with the job id and
//! clients poll `GET /api/jobs/:id` for the full snapshot. Shell output is
//! push-based over Server-Sent Events, one message per output line, ending
//! with a `close` event. Shell input is a separate request/acknowledge write.
//!
//! ## Modules
//!
//! - [`state`]: Shared registries handed to every handler
//! - [`routes`]: Route table and handlers
//! - [`error`]: Mapping of failures to HTTP responses
//! - [`listen`]: Port selection, port file and graceful shutdown

pub mod error;
pub mod listen;
pub mod routes;
pub mod state;

pub use error::{ApiError, ServerError};
pub use listen::serve;
pub use routes::router;
pub use state::AppState;
