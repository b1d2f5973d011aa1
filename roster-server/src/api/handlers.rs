//! Endpoint handlers

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use roster_core::NewMember;

use super::dto::{
    CreatePullRequestRequest, HealthResponse, MergePullRequestRequest, PullRequestDto,
    PullRequestResponse, PullRequestShortDto, ReassignRequest, ReassignResponse, ReviewsResponse,
    SetIsActiveRequest, StatsResponse, TeamDto, TeamQuery, TeamResponse, UserDto, UserQuery,
    UserResponse,
};
use super::error::ApiError;
use super::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// POST /team/add
pub async fn add_team(
    State(state): State<AppState>,
    body: Result<Json<TeamDto>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    let Json(req) = body?;
    let members = req.members.into_iter().map(NewMember::from).collect();
    let team = state.services.teams.create(&req.team_name, members).await?;
    Ok((
        StatusCode::CREATED,
        Json(TeamResponse {
            team: TeamDto::from(team),
        }),
    ))
}

/// GET /team/get?team_name=
pub async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> ApiResult<Json<TeamDto>> {
    let Query(params) = query?;
    let team = state.services.teams.get_by_name(&params.team_name).await?;
    Ok(Json(TeamDto::from(team)))
}

/// POST /users/setIsActive
pub async fn set_is_active(
    State(state): State<AppState>,
    body: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(req) = body?;
    let user = state
        .services
        .users
        .set_is_active(&req.user_id, req.is_active)
        .await?;
    Ok(Json(UserResponse {
        user: UserDto::from(user),
    }))
}

/// GET /users/getReview?user_id=
pub async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<ReviewsResponse>> {
    let Query(params) = query?;
    let prs = state.services.users.get_review_prs(&params.user_id).await?;
    Ok(Json(ReviewsResponse {
        user_id: params.user_id,
        pull_requests: prs.into_iter().map(PullRequestShortDto::from).collect(),
    }))
}

/// POST /pullRequest/create
pub async fn create_pull_request(
    State(state): State<AppState>,
    body: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PullRequestResponse>)> {
    let Json(req) = body?;
    let pr = state.services.pull_requests.create(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(PullRequestResponse {
            pr: PullRequestDto::from(pr),
        }),
    ))
}

/// POST /pullRequest/merge
pub async fn merge_pull_request(
    State(state): State<AppState>,
    body: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> ApiResult<Json<PullRequestResponse>> {
    let Json(req) = body?;
    let pr = state.services.pull_requests.merge(&req.pull_request_id).await?;
    Ok(Json(PullRequestResponse {
        pr: PullRequestDto::from(pr),
    }))
}

/// POST /pullRequest/reassign
pub async fn reassign_reviewer(
    State(state): State<AppState>,
    body: Result<Json<ReassignRequest>, JsonRejection>,
) -> ApiResult<Json<ReassignResponse>> {
    let Json(req) = body?;
    let outcome = state
        .services
        .pull_requests
        .reassign(&req.pull_request_id, &req.old_user_id)
        .await?;
    Ok(Json(ReassignResponse {
        pr: PullRequestDto::from(outcome.pull_request),
        replaced_by: outcome.replaced_by,
    }))
}

/// GET /stats
pub async fn review_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.services.users.review_stats().await?;
    Ok(Json(StatsResponse { stats }))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
