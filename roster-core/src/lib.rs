//! Roster Core - teams, pull requests and reviewer assignment
//!
//! This crate holds the domain model, the reviewer assignment engine, the
//! storage traits with an in-memory implementation, and the services that
//! enforce the review workflow rules.

pub mod assignment;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod service;
pub mod store;

pub use assignment::{ReviewerPicker, MAX_REVIEWERS};
pub use config::{CliOverrides, Config, StorageBackend};
pub use error::{Error, ErrorKind, Result};
pub use memory::InMemoryStore;
pub use models::{NewMember, PrStatus, PullRequest, ReviewerStat, Team, TeamWithMembers, User};
pub use service::{NewPullRequest, Reassignment, Services};
pub use store::{MergeOutcome, PullRequestStore, ReplaceOutcome, Store, TeamStore, UserStore};
