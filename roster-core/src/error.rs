//! Error types for Review Roster

use thiserror::Error;

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of a failure, used to pick a transport status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced entity does not exist
    NotFound,
    /// A state precondition was violated
    Conflict,
    /// No eligible reviewer is left to choose from
    Exhausted,
    /// The request itself is malformed
    Invalid,
    /// Storage, configuration or IO failure
    Internal,
}

/// Error type for roster operations
#[derive(Error, Debug)]
pub enum Error {
    /// Pull request author does not exist
    #[error("Author {0} not found")]
    AuthorNotFound(String),

    /// Team does not exist
    #[error("Team {0} not found")]
    TeamNotFound(String),

    /// User does not exist
    #[error("User {0} not found")]
    UserNotFound(String),

    /// Pull request does not exist
    #[error("Pull request {0} not found")]
    PrNotFound(String),

    /// The reviewer being replaced has no user record
    #[error("Reviewer {0} not found")]
    OldReviewerNotFound(String),

    /// A team with this name already exists
    #[error("Team {0} already exists")]
    TeamExists(String),

    /// A pull request with this id already exists
    #[error("Pull request {0} already exists")]
    PrExists(String),

    /// Mutation attempted on a merged pull request
    #[error("Cannot reassign on merged pull request {0}")]
    PrMerged(String),

    /// The reviewer is not assigned to the pull request
    #[error("Reviewer {user_id} is not assigned to pull request {pr_id}")]
    NotAssigned { pr_id: String, user_id: String },

    /// No active replacement candidate in the team
    #[error("No active replacement candidate for pull request {0}")]
    NoCandidate(String),

    /// Request failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AuthorNotFound(_)
            | Error::TeamNotFound(_)
            | Error::UserNotFound(_)
            | Error::PrNotFound(_)
            | Error::OldReviewerNotFound(_) => ErrorKind::NotFound,
            Error::TeamExists(_)
            | Error::PrExists(_)
            | Error::PrMerged(_)
            | Error::NotAssigned { .. } => ErrorKind::Conflict,
            Error::NoCandidate(_) => ErrorKind::Exhausted,
            Error::InvalidInput(_) => ErrorKind::Invalid,
            Error::Storage(_) | Error::Config(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Error::AuthorNotFound(_)
            | Error::TeamNotFound(_)
            | Error::UserNotFound(_)
            | Error::PrNotFound(_)
            | Error::OldReviewerNotFound(_) => "NOT_FOUND",
            Error::TeamExists(_) => "TEAM_EXISTS",
            Error::PrExists(_) => "PR_EXISTS",
            Error::PrMerged(_) => "PR_MERGED",
            Error::NotAssigned { .. } => "NOT_ASSIGNED",
            Error::NoCandidate(_) => "NO_CANDIDATE",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Storage(_) | Error::Config(_) | Error::Io(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_kinds() {
        assert_eq!(Error::TeamNotFound("t".into()).code(), "NOT_FOUND");
        assert_eq!(Error::TeamNotFound("t".into()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::PrMerged("pr-1".into()).code(), "PR_MERGED");
        assert_eq!(Error::PrMerged("pr-1".into()).kind(), ErrorKind::Conflict);
        assert_eq!(Error::NoCandidate("pr-1".into()).kind(), ErrorKind::Exhausted);
        assert_eq!(Error::Storage("disk".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_not_assigned_message() {
        let err = Error::NotAssigned {
            pr_id: "pr-7".into(),
            user_id: "u3".into(),
        };
        assert_eq!(err.code(), "NOT_ASSIGNED");
        assert_eq!(
            err.to_string(),
            "Reviewer u3 is not assigned to pull request pr-7"
        );
    }
}
