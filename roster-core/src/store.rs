//! Storage abstraction
//!
//! Services talk to persistence only through these traits. Implementations
//! must make every per-row mutation atomic: a merge or a reviewer swap is a
//! single read-modify-write that cannot interleave with another one on the
//! same pull request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{PullRequest, Team, User};
use crate::Result;

/// Persistence for teams
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Insert a new team; fails with `Error::TeamExists` on a duplicate name
    async fn create_team(&self, team: &Team) -> Result<()>;

    /// Insert a new team and upsert its members as one unit: either the
    /// team and every member are stored, or nothing is
    async fn create_team_with_members(&self, team: &Team, members: &[User]) -> Result<()>;

    /// Look up a team by name
    async fn find_team(&self, name: &str) -> Result<Option<Team>>;
}

/// Persistence for users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert the user or overwrite name, active flag and team of an existing one
    async fn upsert_user(&self, user: &User) -> Result<()>;

    /// Look up a user by id
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Members of a team ordered by id, optionally only active ones
    async fn list_team_members(&self, team_name: &str, active_only: bool) -> Result<Vec<User>>;

    /// All users ordered by id
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Set the active flag; returns the updated user, or None if absent
    async fn set_user_active(&self, id: &str, active: bool) -> Result<Option<User>>;
}

/// Result of an atomic reviewer swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The swap happened; carries the updated pull request
    Replaced(PullRequest),
    /// No such pull request
    NotFound,
    /// The pull request was merged before the swap could apply
    Merged,
    /// The old reviewer is no longer assigned
    NotAssigned,
    /// The new reviewer was assigned by a concurrent request first
    Taken,
}

/// Result of an atomic merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// This call moved the pull request from OPEN to MERGED
    Merged(PullRequest),
    /// The pull request was merged earlier; returned untouched
    AlreadyMerged(PullRequest),
    /// No such pull request
    NotFound,
}

/// Persistence for pull requests and their reviewers
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Insert a pull request with its reviewers; fails with
    /// `Error::PrExists` on a duplicate id
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()>;

    /// Look up a pull request with its reviewers
    async fn get_pull_request(&self, id: &str) -> Result<Option<PullRequest>>;

    /// Transition OPEN to MERGED stamping `merged_at`. An already merged
    /// pull request is returned untouched.
    async fn mark_merged(&self, id: &str, merged_at: DateTime<Utc>) -> Result<MergeOutcome>;

    /// Swap one reviewer for another in the same slot, only while the pull
    /// request is open and `old_reviewer_id` is still assigned
    async fn replace_reviewer(
        &self,
        id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<ReplaceOutcome>;

    /// Pull requests reviewed by `user_id`, any status, oldest first
    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequest>>;

    /// `(user_id, count)` for every user with at least one assignment
    async fn review_counts(&self) -> Result<Vec<(String, u64)>>;
}

/// Everything the services need from a backend
pub trait Store: TeamStore + UserStore + PullRequestStore {}

impl<T: TeamStore + UserStore + PullRequestStore> Store for T {}
