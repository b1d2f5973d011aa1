//! Wire shapes for requests and responses

use chrono::{DateTime, Utc};
use roster_core::{
    NewMember, NewPullRequest, PrStatus, PullRequest, ReviewerStat, TeamWithMembers, User,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberDto {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl From<User> for TeamMemberDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.name,
            is_active: user.is_active,
        }
    }
}

impl From<TeamMemberDto> for NewMember {
    fn from(member: TeamMemberDto) -> Self {
        NewMember {
            id: member.user_id,
            name: member.username,
            is_active: member.is_active,
        }
    }
}

/// A team with its members; also the body of `POST /team/add`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDto {
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<TeamMemberDto>,
}

impl From<TeamWithMembers> for TeamDto {
    fn from(team: TeamWithMembers) -> Self {
        Self {
            team_name: team.team.name,
            members: team.members.into_iter().map(TeamMemberDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.name,
            team_name: user.team_name,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequest> for PullRequestDto {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.title,
            author_id: pr.author_id,
            status: pr.status,
            assigned_reviewers: pr.reviewers,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
        }
    }
}

/// Pull request summary used in review listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShortDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
}

impl From<PullRequest> for PullRequestShortDto {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.title,
            author_id: pr.author_id,
            status: pr.status,
        }
    }
}

// Requests

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetIsActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatePullRequestRequest {
    #[serde(default)]
    pub pull_request_id: Option<String>,
    pub pull_request_name: String,
    pub author_id: String,
}

impl From<CreatePullRequestRequest> for NewPullRequest {
    fn from(req: CreatePullRequestRequest) -> Self {
        NewPullRequest {
            id: req.pull_request_id,
            title: req.pull_request_name,
            author_id: req.author_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MergePullRequestRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub pull_request_id: String,
    pub old_user_id: String,
}

// Responses

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamResponse {
    pub team: TeamDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequestResponse {
    pub pr: PullRequestDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReassignResponse {
    pub pr: PullRequestDto,
    pub replaced_by: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShortDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub stats: Vec<ReviewerStat>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
