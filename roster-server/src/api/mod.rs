//! REST API routes
//!
//! Handlers decode JSON, call into [`Services`] and map failures to
//! `{"error": {"code", "message"}}` bodies via [`ApiError`].

pub mod dto;
pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use roster_core::Services;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared state for the axum routes
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

/// Build the full application router over `services`
pub fn router(services: Services) -> Router {
    Router::new()
        .route("/team/add", post(handlers::add_team))
        .route("/team/get", get(handlers::get_team))
        .route("/users/setIsActive", post(handlers::set_is_active))
        .route("/users/getReview", get(handlers::get_review))
        .route("/pullRequest/create", post(handlers::create_pull_request))
        .route("/pullRequest/merge", post(handlers::merge_pull_request))
        .route("/pullRequest/reassign", post(handlers::reassign_reviewer))
        .route("/stats", get(handlers::review_stats))
        .route("/health", get(handlers::health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(AppState { services })
}
