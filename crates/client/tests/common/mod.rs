//! Shared test utilities for the client crate.
//!
//! - `fake_api`: scripted in-memory [`DashboardApi`] implementation
//! - `live_server`: a real dashboard server on an ephemeral port

#![allow(dead_code)]

pub mod fake_api;
pub mod live_server;

pub use fake_api::*;
pub use live_server::*;
