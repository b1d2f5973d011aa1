//! Repository modules for database operations

pub mod pull_requests;
pub mod teams;
pub mod users;

pub use pull_requests::PullRequestsRepo;
pub use teams::TeamsRepo;
pub use users::UsersRepo;
