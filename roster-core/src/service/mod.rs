//! Business operations over the store
//!
//! Each service owns handles to the store traits it needs; [`Services`]
//! wires all of them to a single backend.

pub mod pull_request;
pub mod team;
pub mod user;

use std::sync::Arc;

use crate::assignment::ReviewerPicker;
use crate::store::{PullRequestStore, Store, TeamStore, UserStore};
use crate::{Error, Result};

pub use pull_request::{NewPullRequest, PullRequestService, Reassignment};
pub use team::TeamService;
pub use user::UserService;

/// All services sharing one store and one random source
#[derive(Clone)]
pub struct Services {
    pub teams: TeamService,
    pub users: UserService,
    pub pull_requests: PullRequestService,
}

impl Services {
    /// Build the services over `store`
    pub fn new<S: Store + 'static>(store: Arc<S>, picker: ReviewerPicker) -> Self {
        let picker = Arc::new(picker);
        Self {
            teams: TeamService::new(store.clone(), store.clone()),
            users: UserService::new(store.clone(), store.clone()),
            pull_requests: PullRequestService::new(store.clone(), store.clone(), store, picker),
        }
    }

    /// Build the services over separate per-entity stores
    pub fn from_stores(
        teams: Arc<dyn TeamStore>,
        users: Arc<dyn UserStore>,
        pull_requests: Arc<dyn PullRequestStore>,
        picker: ReviewerPicker,
    ) -> Self {
        let picker = Arc::new(picker);
        Self {
            teams: TeamService::new(teams.clone(), users.clone()),
            users: UserService::new(users.clone(), pull_requests.clone()),
            pull_requests: PullRequestService::new(pull_requests, users, teams, picker),
        }
    }
}

/// Reject empty or whitespace-only required fields
pub(crate) fn require<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}
