//! Database layer for Review Roster
//!
//! SQLite persistence for teams, users, and pull requests. Each repository
//! implements the matching store trait from `roster-core`, so the service
//! layer never sees SQL.

pub mod connection;
pub mod error;
pub mod repos;

pub use connection::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use repos::{PullRequestsRepo, TeamsRepo, UsersRepo};
