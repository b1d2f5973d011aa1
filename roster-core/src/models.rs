//! Domain records: users, teams and pull requests

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A team member who can author and review pull requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Client supplied identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Inactive users are never picked as reviewers
    pub is_active: bool,

    /// Name of the team the user belongs to
    pub team_name: String,
}

impl User {
    /// Create a new user record
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        team_name: impl Into<String>,
        is_active: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_active,
            team_name: team_name.into(),
        }
    }
}

/// A team; its name doubles as its identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team name
    pub name: String,

    /// When the team was created
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team record stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A team together with all of its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamWithMembers {
    pub team: Team,
    pub members: Vec<User>,
}

/// A member as submitted when creating a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

impl NewMember {
    /// Turn the submission into a user record of `team_name`
    pub fn into_user(self, team_name: &str) -> User {
        User::new(self.id, self.name, team_name, self.is_active)
    }
}

/// Pull request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(Error::Storage(format!("unknown pull request status: {}", other))),
        }
    }
}

/// Pull request with its assigned reviewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Unique identifier
    pub id: String,

    /// Pull request title
    pub title: String,

    /// User who opened the pull request
    pub author_id: String,

    /// OPEN until merged; never goes back
    pub status: PrStatus,

    /// Assigned reviewers in assignment order (at most two)
    pub reviewers: Vec<String>,

    /// When the pull request was created
    pub created_at: DateTime<Utc>,

    /// When the pull request was merged (None while open)
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Create a new open pull request
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            reviewers: Vec::new(),
            created_at: Utc::now(),
            merged_at: None,
        }
    }

    /// Set the assigned reviewers
    pub fn with_reviewers(mut self, reviewers: Vec<String>) -> Self {
        self.reviewers = reviewers;
        self
    }

    /// Check if the pull request has been merged
    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged
    }

    /// Position of `user_id` in the reviewer list
    pub fn reviewer_position(&self, user_id: &str) -> Option<usize> {
        self.reviewers.iter().position(|r| r == user_id)
    }

    /// Check if `user_id` is an assigned reviewer
    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.reviewer_position(user_id).is_some()
    }

    /// Mark as merged at `at`. Returns false if it was already merged,
    /// in which case nothing changes.
    pub fn merge(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_merged() {
            return false;
        }
        self.status = PrStatus::Merged;
        self.merged_at = Some(at);
        true
    }
}

/// How many pull requests a user is currently reviewing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerStat {
    pub user_id: String,
    pub username: String,
    pub review_count: u64,
}
