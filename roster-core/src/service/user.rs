//! User activity and review queries

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{PullRequest, ReviewerStat, User};
use crate::store::{PullRequestStore, UserStore};
use crate::{Error, Result};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    pull_requests: Arc<dyn PullRequestStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, pull_requests: Arc<dyn PullRequestStore>) -> Self {
        Self {
            users,
            pull_requests,
        }
    }

    /// Toggle whether the user can be picked as a reviewer
    pub async fn set_is_active(&self, user_id: &str, active: bool) -> Result<User> {
        let user = self
            .users
            .set_user_active(user_id, active)
            .await?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        tracing::info!(user = %user_id, active, "User activity changed");
        Ok(user)
    }

    /// Pull requests the user is reviewing, open or merged
    pub async fn get_review_prs(&self, user_id: &str) -> Result<Vec<PullRequest>> {
        self.pull_requests.list_by_reviewer(user_id).await
    }

    /// Review load per user, busiest first
    pub async fn review_stats(&self) -> Result<Vec<ReviewerStat>> {
        let counts: HashMap<String, u64> =
            self.pull_requests.review_counts().await?.into_iter().collect();

        let mut stats: Vec<ReviewerStat> = self
            .users
            .list_users()
            .await?
            .into_iter()
            .map(|u| ReviewerStat {
                review_count: counts.get(&u.id).copied().unwrap_or(0),
                user_id: u.id,
                username: u.name,
            })
            .collect();

        stats.sort_by(|a, b| {
            b.review_count
                .cmp(&a.review_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(stats)
    }
}
