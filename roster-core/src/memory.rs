//! In-memory store
//!
//! Backs the service when no database is configured, and serves as the
//! store in service and HTTP tests. All tables sit behind one lock so each
//! operation observes and mutates a consistent snapshot.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::assignment::apply_replacement;
use crate::models::{PullRequest, Team, User};
use crate::store::{MergeOutcome, PullRequestStore, ReplaceOutcome, TeamStore, UserStore};
use crate::{Error, Result};

#[derive(Default)]
struct Tables {
    teams: HashMap<String, Team>,
    users: BTreeMap<String, User>,
    pull_requests: HashMap<String, PullRequest>,
}

/// Store keeping everything in process memory
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn create_team(&self, team: &Team) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.teams.contains_key(&team.name) {
            return Err(Error::TeamExists(team.name.clone()));
        }
        tables.teams.insert(team.name.clone(), team.clone());
        Ok(())
    }

    async fn create_team_with_members(&self, team: &Team, members: &[User]) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.teams.contains_key(&team.name) {
            return Err(Error::TeamExists(team.name.clone()));
        }
        tables.teams.insert(team.name.clone(), team.clone());
        for member in members {
            let user = User {
                team_name: team.name.clone(),
                ..member.clone()
            };
            tables.users.insert(user.id.clone(), user);
        }
        Ok(())
    }

    async fn find_team(&self, name: &str) -> Result<Option<Team>> {
        Ok(self.tables.read().await.teams.get(name).cloned())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn upsert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.teams.contains_key(&user.team_name) {
            return Err(Error::TeamNotFound(user.team_name.clone()));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn list_team_members(&self, team_name: &str, active_only: bool) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.team_name == team_name && (!active_only || u.is_active))
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn set_user_active(&self, id: &str, active: bool) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(id).map(|user| {
            user.is_active = active;
            user.clone()
        }))
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.pull_requests.contains_key(&pr.id) {
            return Err(Error::PrExists(pr.id.clone()));
        }
        tables.pull_requests.insert(pr.id.clone(), pr.clone());
        Ok(())
    }

    async fn get_pull_request(&self, id: &str) -> Result<Option<PullRequest>> {
        Ok(self.tables.read().await.pull_requests.get(id).cloned())
    }

    async fn mark_merged(&self, id: &str, merged_at: DateTime<Utc>) -> Result<MergeOutcome> {
        let mut tables = self.tables.write().await;
        let Some(pr) = tables.pull_requests.get_mut(id) else {
            return Ok(MergeOutcome::NotFound);
        };
        if pr.merge(merged_at) {
            Ok(MergeOutcome::Merged(pr.clone()))
        } else {
            Ok(MergeOutcome::AlreadyMerged(pr.clone()))
        }
    }

    async fn replace_reviewer(
        &self,
        id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<ReplaceOutcome> {
        let mut tables = self.tables.write().await;
        let Some(pr) = tables.pull_requests.get_mut(id) else {
            return Ok(ReplaceOutcome::NotFound);
        };
        if pr.is_merged() {
            return Ok(ReplaceOutcome::Merged);
        }
        if !pr.has_reviewer(old_reviewer_id) {
            return Ok(ReplaceOutcome::NotAssigned);
        }
        if pr.has_reviewer(new_reviewer_id) {
            return Ok(ReplaceOutcome::Taken);
        }
        apply_replacement(pr, old_reviewer_id, new_reviewer_id)?;
        Ok(ReplaceOutcome::Replaced(pr.clone()))
    }

    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequest>> {
        let tables = self.tables.read().await;
        let mut prs: Vec<PullRequest> = tables
            .pull_requests
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .cloned()
            .collect();
        prs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(prs)
    }

    async fn review_counts(&self) -> Result<Vec<(String, u64)>> {
        let tables = self.tables.read().await;
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for reviewer in tables.pull_requests.values().flat_map(|pr| pr.reviewers.iter()) {
            *counts.entry(reviewer.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}
