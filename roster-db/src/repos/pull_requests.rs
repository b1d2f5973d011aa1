//! Pull request repository
//!
//! Reviewers live in `pr_reviewers`, one row per slot. Status changes and
//! reviewer swaps are single guarded UPDATE statements, so a concurrent
//! merge and reassign on the same pull request cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_core::store::{MergeOutcome, PullRequestStore, ReplaceOutcome};
use roster_core::{PrStatus, PullRequest};
use sqlx::SqlitePool;

use crate::error::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct PullRequestRow {
    id: String,
    title: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    fn into_pull_request(self, reviewers: Vec<String>) -> Result<PullRequest> {
        let status: PrStatus = self
            .status
            .parse()
            .map_err(|e: roster_core::Error| Error::InvalidData(e.to_string()))?;
        Ok(PullRequest {
            id: self.id,
            title: self.title,
            author_id: self.author_id,
            status,
            reviewers,
            created_at: self.created_at,
            merged_at: self.merged_at,
        })
    }
}

/// Repository for pull requests and their reviewer slots
#[derive(Clone)]
pub struct PullRequestsRepo {
    pool: SqlitePool,
}

impl PullRequestsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a pull request and its reviewers in one transaction
    pub async fn insert(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pull_requests (id, title, author_id, status, created_at, merged_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.id)
        .bind(&pr.title)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&mut *tx)
        .await?;

        for (position, reviewer_id) in pr.reviewers.iter().enumerate() {
            sqlx::query("INSERT INTO pr_reviewers (pr_id, position, reviewer_id) VALUES (?, ?, ?)")
                .bind(&pr.id)
                .bind(position as i64)
                .bind(reviewer_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Find a pull request by ID, reviewers in slot order
    pub async fn find_by_id(&self, id: &str) -> Result<Option<PullRequest>> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            "SELECT id, title, author_id, status, created_at, merged_at FROM pull_requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let reviewers = self.reviewers(&row.id).await?;
                Ok(Some(row.into_pull_request(reviewers)?))
            }
            None => Ok(None),
        }
    }

    async fn reviewers(&self, pr_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT reviewer_id FROM pr_reviewers WHERE pr_id = ? ORDER BY position",
        )
        .bind(pr_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Flip OPEN to MERGED; a merged pull request keeps its original stamp
    pub async fn merge(&self, id: &str, merged_at: DateTime<Utc>) -> Result<MergeOutcome> {
        let result = sqlx::query(
            "UPDATE pull_requests SET status = 'MERGED', merged_at = ? WHERE id = ? AND status = 'OPEN'",
        )
        .bind(merged_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        let transitioned = result.rows_affected() == 1;

        Ok(match self.find_by_id(id).await? {
            None => MergeOutcome::NotFound,
            Some(pr) if transitioned => MergeOutcome::Merged(pr),
            Some(pr) => MergeOutcome::AlreadyMerged(pr),
        })
    }

    /// Swap a reviewer in place while the pull request is open
    pub async fn replace(
        &self,
        id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<ReplaceOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE pr_reviewers SET reviewer_id = ?
            WHERE pr_id = ? AND reviewer_id = ?
              AND EXISTS (SELECT 1 FROM pull_requests WHERE id = ? AND status = 'OPEN')
            "#,
        )
        .bind(new_reviewer_id)
        .bind(id)
        .bind(old_reviewer_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::from);

        let updated = match result {
            Ok(done) => done.rows_affected() == 1,
            // The new reviewer already holds the other slot
            Err(e) if e.is_unique_violation() => false,
            Err(e) => return Err(e),
        };

        let current = self.find_by_id(id).await?;
        Ok(match current {
            None => ReplaceOutcome::NotFound,
            Some(pr) if updated => ReplaceOutcome::Replaced(pr),
            Some(pr) if pr.is_merged() => ReplaceOutcome::Merged,
            Some(pr) if pr.has_reviewer(old_reviewer_id) && pr.has_reviewer(new_reviewer_id) => {
                ReplaceOutcome::Taken
            }
            Some(_) => ReplaceOutcome::NotAssigned,
        })
    }

    /// Pull requests a user reviews, oldest first
    pub async fn find_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequest>> {
        let rows = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT p.id, p.title, p.author_id, p.status, p.created_at, p.merged_at
            FROM pull_requests p
            INNER JOIN pr_reviewers r ON r.pr_id = p.id
            WHERE r.reviewer_id = ?
            ORDER BY p.created_at, p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut prs = Vec::with_capacity(rows.len());
        for row in rows {
            let reviewers = self.reviewers(&row.id).await?;
            prs.push(row.into_pull_request(reviewers)?);
        }
        Ok(prs)
    }

    /// Assignment count per reviewer
    pub async fn count_by_reviewer(&self) -> Result<Vec<(String, u64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT reviewer_id, COUNT(*) FROM pr_reviewers GROUP BY reviewer_id ORDER BY reviewer_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }
}

#[async_trait]
impl PullRequestStore for PullRequestsRepo {
    async fn create_pull_request(&self, pr: &PullRequest) -> roster_core::Result<()> {
        match self.insert(pr).await {
            Err(e) if e.is_unique_violation() => Err(roster_core::Error::PrExists(pr.id.clone())),
            other => Ok(other?),
        }
    }

    async fn get_pull_request(&self, id: &str) -> roster_core::Result<Option<PullRequest>> {
        Ok(self.find_by_id(id).await?)
    }

    async fn mark_merged(
        &self,
        id: &str,
        merged_at: DateTime<Utc>,
    ) -> roster_core::Result<MergeOutcome> {
        Ok(self.merge(id, merged_at).await?)
    }

    async fn replace_reviewer(
        &self,
        id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> roster_core::Result<ReplaceOutcome> {
        Ok(self.replace(id, old_reviewer_id, new_reviewer_id).await?)
    }

    async fn list_by_reviewer(&self, user_id: &str) -> roster_core::Result<Vec<PullRequest>> {
        Ok(self.find_by_reviewer(user_id).await?)
    }

    async fn review_counts(&self) -> roster_core::Result<Vec<(String, u64)>> {
        Ok(self.count_by_reviewer().await?)
    }
}
