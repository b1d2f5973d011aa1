//! Roster Server - HTTP interface for Review Roster
//!
//! Exposes the team, user and pull request services as a JSON API and
//! owns the server lifecycle used by the `roster` binary.

pub mod api;
pub mod server;

pub use api::{router, ApiError, AppState};
pub use server::{serve, shutdown_signal, Backend};
