//! Pull request lifecycle: create with reviewers, merge, reassign

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::assignment::ReviewerPicker;
use crate::models::PullRequest;
use crate::service::require;
use crate::store::{MergeOutcome, PullRequestStore, ReplaceOutcome, TeamStore, UserStore};
use crate::{Error, Result};

/// How often reassign re-picks when its candidate is taken concurrently
const REASSIGN_ATTEMPTS: usize = 3;

/// Input for creating a pull request
#[derive(Debug, Clone, Default)]
pub struct NewPullRequest {
    /// Caller chosen id; a UUID is generated when absent
    pub id: Option<String>,
    pub title: String,
    pub author_id: String,
}

/// Outcome of a successful reassignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

#[derive(Clone)]
pub struct PullRequestService {
    pull_requests: Arc<dyn PullRequestStore>,
    users: Arc<dyn UserStore>,
    teams: Arc<dyn TeamStore>,
    picker: Arc<ReviewerPicker>,
}

impl PullRequestService {
    pub fn new(
        pull_requests: Arc<dyn PullRequestStore>,
        users: Arc<dyn UserStore>,
        teams: Arc<dyn TeamStore>,
        picker: Arc<ReviewerPicker>,
    ) -> Self {
        Self {
            pull_requests,
            users,
            teams,
            picker,
        }
    }

    /// Open a pull request and assign up to two reviewers from the author's team
    pub async fn create(&self, new: NewPullRequest) -> Result<PullRequest> {
        let title = require("pull_request_name", &new.title)?;
        let author_id = require("author_id", &new.author_id)?;
        let id = match new.id.as_deref() {
            Some(id) => require("pull_request_id", id)?.to_string(),
            None => Uuid::new_v4().to_string(),
        };

        let author = self
            .users
            .get_user(author_id)
            .await?
            .ok_or_else(|| Error::AuthorNotFound(author_id.to_string()))?;
        let team = self
            .teams
            .find_team(&author.team_name)
            .await?
            .ok_or_else(|| Error::TeamNotFound(author.team_name.clone()))?;

        if self.pull_requests.get_pull_request(&id).await?.is_some() {
            return Err(Error::PrExists(id));
        }

        let members = self.users.list_team_members(&team.name, true).await?;
        let reviewers = self.picker.assign_initial(&author.id, &members);
        tracing::debug!(pr = %id, candidates = members.len(), ?reviewers, "Reviewers selected");

        let pr = PullRequest::new(id, title, author.id).with_reviewers(reviewers);
        self.pull_requests.create_pull_request(&pr).await?;

        tracing::info!(
            pr = %pr.id,
            author = %pr.author_id,
            team = %team.name,
            reviewers = pr.reviewers.len(),
            "Pull request created"
        );
        Ok(pr)
    }

    /// Merge a pull request; merging twice returns the first result unchanged
    pub async fn merge(&self, pr_id: &str) -> Result<PullRequest> {
        match self.pull_requests.mark_merged(pr_id, Utc::now()).await? {
            MergeOutcome::Merged(pr) => {
                tracing::info!(pr = %pr_id, "Pull request merged");
                Ok(pr)
            }
            MergeOutcome::AlreadyMerged(pr) => {
                tracing::debug!(pr = %pr_id, "Pull request already merged");
                Ok(pr)
            }
            MergeOutcome::NotFound => Err(Error::PrNotFound(pr_id.to_string())),
        }
    }

    /// Replace `old_reviewer_id` with another active member of their team
    ///
    /// If a concurrent request assigns the chosen replacement first, the
    /// pull request is re-read and a new candidate is picked.
    pub async fn reassign(&self, pr_id: &str, old_reviewer_id: &str) -> Result<Reassignment> {
        for attempt in 1..=REASSIGN_ATTEMPTS {
            let pr = self
                .pull_requests
                .get_pull_request(pr_id)
                .await?
                .ok_or_else(|| Error::PrNotFound(pr_id.to_string()))?;

            if pr.is_merged() {
                tracing::warn!(pr = %pr_id, "Reassign rejected: pull request merged");
                return Err(Error::PrMerged(pr.id));
            }
            if !pr.has_reviewer(old_reviewer_id) {
                return Err(Error::NotAssigned {
                    pr_id: pr.id,
                    user_id: old_reviewer_id.to_string(),
                });
            }

            let old_reviewer = self
                .users
                .get_user(old_reviewer_id)
                .await?
                .ok_or_else(|| Error::OldReviewerNotFound(old_reviewer_id.to_string()))?;
            let members = self
                .users
                .list_team_members(&old_reviewer.team_name, true)
                .await?;

            let new_reviewer_id = self
                .picker
                .select_replacement(&pr, old_reviewer_id, &members)?;

            match self
                .pull_requests
                .replace_reviewer(pr_id, old_reviewer_id, &new_reviewer_id)
                .await?
            {
                ReplaceOutcome::Replaced(updated) => {
                    tracing::info!(
                        pr = %pr_id,
                        old = %old_reviewer_id,
                        new = %new_reviewer_id,
                        "Reviewer reassigned"
                    );
                    return Ok(Reassignment {
                        pull_request: updated,
                        replaced_by: new_reviewer_id,
                    });
                }
                ReplaceOutcome::NotFound => return Err(Error::PrNotFound(pr_id.to_string())),
                ReplaceOutcome::Merged => return Err(Error::PrMerged(pr_id.to_string())),
                ReplaceOutcome::NotAssigned => {
                    return Err(Error::NotAssigned {
                        pr_id: pr_id.to_string(),
                        user_id: old_reviewer_id.to_string(),
                    })
                }
                ReplaceOutcome::Taken => {
                    tracing::debug!(
                        pr = %pr_id,
                        candidate = %new_reviewer_id,
                        attempt,
                        "Replacement assigned concurrently, picking again"
                    );
                }
            }
        }

        tracing::warn!(pr = %pr_id, "Reassign gave up after repeated conflicts");
        Err(Error::NoCandidate(pr_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::models::{NewMember, PrStatus};
    use crate::service::Services;

    fn member(id: &str, active: bool) -> NewMember {
        NewMember {
            id: id.to_string(),
            name: id.to_uppercase(),
            is_active: active,
        }
    }

    async fn services_with_team(members: Vec<NewMember>) -> Services {
        let services = Services::new(Arc::new(InMemoryStore::new()), ReviewerPicker::seeded(11));
        services.teams.create("T", members).await.unwrap();
        services
    }

    fn new_pr(id: &str, author: &str) -> NewPullRequest {
        NewPullRequest {
            id: Some(id.to_string()),
            title: format!("Change {}", id),
            author_id: author.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_two_reviewers() {
        let services = services_with_team(vec![
            member("a", true),
            member("b", true),
            member("c", true),
            member("d", true),
        ])
        .await;

        for i in 0..20 {
            let pr = services
                .pull_requests
                .create(new_pr(&format!("pr-{}", i), "a"))
                .await
                .unwrap();
            assert_eq!(pr.status, PrStatus::Open);
            assert_eq!(pr.reviewers.len(), 2);
            assert_ne!(pr.reviewers[0], pr.reviewers[1]);
            assert!(!pr.reviewers.contains(&"a".to_string()));
        }
    }

    #[tokio::test]
    async fn test_create_with_small_team() {
        let services = services_with_team(vec![member("a", true), member("b", false)]).await;
        let pr = services.pull_requests.create(new_pr("pr-1", "a")).await.unwrap();
        assert!(pr.reviewers.is_empty());
    }

    #[tokio::test]
    async fn test_create_generates_id_when_missing() {
        let services = services_with_team(vec![member("a", true), member("b", true)]).await;
        let pr = services
            .pull_requests
            .create(NewPullRequest {
                id: None,
                title: "No id".to_string(),
                author_id: "a".to_string(),
            })
            .await
            .unwrap();
        assert!(Uuid::parse_str(&pr.id).is_ok());
        assert_eq!(pr.reviewers, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_create_errors() {
        let services = services_with_team(vec![member("a", true), member("b", true)]).await;

        let err = services
            .pull_requests
            .create(new_pr("pr-1", "ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthorNotFound(_)));

        services.pull_requests.create(new_pr("pr-1", "a")).await.unwrap();
        let err = services
            .pull_requests
            .create(new_pr("pr-1", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PrExists(id) if id == "pr-1"));

        let err = services
            .pull_requests
            .create(NewPullRequest {
                id: Some("pr-2".into()),
                title: " ".into(),
                author_id: "a".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let services = services_with_team(vec![member("a", true), member("b", true)]).await;
        services.pull_requests.create(new_pr("pr-1", "a")).await.unwrap();

        let first = services.pull_requests.merge("pr-1").await.unwrap();
        assert_eq!(first.status, PrStatus::Merged);
        assert!(first.merged_at.is_some());

        let second = services.pull_requests.merge("pr-1").await.unwrap();
        assert_eq!(second, first);

        let err = services.pull_requests.merge("pr-404").await.unwrap_err();
        assert!(matches!(err, Error::PrNotFound(_)));
    }

    #[tokio::test]
    async fn test_reassign_picks_only_remaining_candidate() {
        let services = services_with_team(vec![
            member("a", true),
            member("b", true),
            member("c", true),
            member("d", true),
        ])
        .await;
        let pr = services.pull_requests.create(new_pr("pr-1", "a")).await.unwrap();
        let old = pr.reviewers[0].clone();
        let kept = pr.reviewers[1].clone();
        let expected = ["b", "c", "d"]
            .into_iter()
            .find(|id| *id != old && *id != kept)
            .unwrap();

        let result = services.pull_requests.reassign("pr-1", &old).await.unwrap();
        assert_eq!(result.replaced_by, expected);
        assert_eq!(result.pull_request.reviewers, vec![expected.to_string(), kept]);
        assert_eq!(result.pull_request.status, PrStatus::Open);
    }

    #[tokio::test]
    async fn test_reassign_no_candidate_when_last_member_inactive() {
        let services = services_with_team(vec![
            member("a", true),
            member("b", true),
            member("c", true),
            member("d", true),
        ])
        .await;
        let pr = services.pull_requests.create(new_pr("pr-1", "a")).await.unwrap();
        let spare = ["b", "c", "d"]
            .into_iter()
            .find(|id| !pr.reviewers.contains(&id.to_string()))
            .unwrap();
        services.users.set_is_active(spare, false).await.unwrap();

        let err = services
            .pull_requests
            .reassign("pr-1", &pr.reviewers[0])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoCandidate(_)));
    }

    #[tokio::test]
    async fn test_reassign_rejections() {
        let services = services_with_team(vec![
            member("a", true),
            member("b", true),
            member("c", true),
        ])
        .await;
        let pr = services.pull_requests.create(new_pr("pr-1", "a")).await.unwrap();

        let err = services.pull_requests.reassign("pr-404", "b").await.unwrap_err();
        assert!(matches!(err, Error::PrNotFound(_)));

        let err = services.pull_requests.reassign("pr-1", "a").await.unwrap_err();
        assert!(matches!(err, Error::NotAssigned { .. }));

        services.pull_requests.merge("pr-1").await.unwrap();
        let err = services
            .pull_requests
            .reassign("pr-1", &pr.reviewers[0])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PrMerged(_)));

        let after = services.pull_requests.merge("pr-1").await.unwrap();
        assert_eq!(after.reviewers, pr.reviewers);
    }

    /// Reassigns the other slot to the same candidate just before the
    /// first swap lands, as a concurrent request would
    struct InterleavedStore {
        inner: Arc<InMemoryStore>,
        raced: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl PullRequestStore for InterleavedStore {
        async fn create_pull_request(&self, pr: &PullRequest) -> Result<()> {
            self.inner.create_pull_request(pr).await
        }

        async fn get_pull_request(&self, id: &str) -> Result<Option<PullRequest>> {
            self.inner.get_pull_request(id).await
        }

        async fn mark_merged(
            &self,
            id: &str,
            merged_at: chrono::DateTime<Utc>,
        ) -> Result<MergeOutcome> {
            self.inner.mark_merged(id, merged_at).await
        }

        async fn replace_reviewer(
            &self,
            id: &str,
            old_reviewer_id: &str,
            new_reviewer_id: &str,
        ) -> Result<ReplaceOutcome> {
            use std::sync::atomic::Ordering;
            if !self.raced.swap(true, Ordering::SeqCst) {
                let pr = self.inner.get_pull_request(id).await?.unwrap();
                let other = pr
                    .reviewers
                    .iter()
                    .find(|r| r.as_str() != old_reviewer_id)
                    .unwrap()
                    .clone();
                self.inner.replace_reviewer(id, &other, new_reviewer_id).await?;
            }
            self.inner
                .replace_reviewer(id, old_reviewer_id, new_reviewer_id)
                .await
        }

        async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequest>> {
            self.inner.list_by_reviewer(user_id).await
        }

        async fn review_counts(&self) -> Result<Vec<(String, u64)>> {
            self.inner.review_counts().await
        }
    }

    #[tokio::test]
    async fn test_reassign_repicks_when_candidate_taken() {
        let store = Arc::new(InMemoryStore::new());
        let interleaved = Arc::new(InterleavedStore {
            inner: store.clone(),
            raced: std::sync::atomic::AtomicBool::new(false),
        });
        let services =
            Services::from_stores(store.clone(), store.clone(), interleaved, ReviewerPicker::seeded(3));
        services
            .teams
            .create(
                "T",
                vec![
                    member("a", true),
                    member("b", true),
                    member("c", true),
                    member("d", true),
                    member("e", true),
                ],
            )
            .await
            .unwrap();
        store
            .create_pull_request(
                &PullRequest::new("pr-1", "Change", "a")
                    .with_reviewers(vec!["b".to_string(), "c".to_string()]),
            )
            .await
            .unwrap();

        let result = services.pull_requests.reassign("pr-1", "b").await.unwrap();

        let reviewers = &result.pull_request.reviewers;
        assert_eq!(reviewers.len(), 2);
        assert_eq!(reviewers[0], result.replaced_by);
        assert_ne!(reviewers[0], reviewers[1]);
        let mut sorted = reviewers.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["d".to_string(), "e".to_string()]);
    }
}
