//! Team repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_core::store::TeamStore;
use roster_core::{Team, User};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::repos::users::UPSERT_USER;

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    name: String,
    created_at: DateTime<Utc>,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Team {
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Repository for teams
#[derive(Clone)]
pub struct TeamsRepo {
    pool: SqlitePool,
}

impl TeamsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a team record
    pub async fn insert(&self, team: &Team) -> Result<()> {
        sqlx::query("INSERT INTO teams (name, created_at) VALUES (?, ?)")
            .bind(&team.name)
            .bind(team.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert a team and upsert its members in one transaction
    pub async fn insert_with_members(&self, team: &Team, members: &[User]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO teams (name, created_at) VALUES (?, ?)")
            .bind(&team.name)
            .bind(team.created_at)
            .execute(&mut *tx)
            .await?;

        for member in members {
            sqlx::query(UPSERT_USER)
                .bind(&member.id)
                .bind(&member.name)
                .bind(member.is_active)
                .bind(&team.name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Find a team by name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Team>> {
        let row = sqlx::query_as::<_, TeamRow>("SELECT name, created_at FROM teams WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Team::from))
    }
}

#[async_trait]
impl TeamStore for TeamsRepo {
    async fn create_team(&self, team: &Team) -> roster_core::Result<()> {
        match self.insert(team).await {
            Err(e) if e.is_unique_violation() => {
                Err(roster_core::Error::TeamExists(team.name.clone()))
            }
            other => Ok(other?),
        }
    }

    async fn create_team_with_members(
        &self,
        team: &Team,
        members: &[User],
    ) -> roster_core::Result<()> {
        match self.insert_with_members(team, members).await {
            Err(e) if e.is_unique_violation() => {
                Err(roster_core::Error::TeamExists(team.name.clone()))
            }
            other => Ok(other?),
        }
    }

    async fn find_team(&self, name: &str) -> roster_core::Result<Option<Team>> {
        Ok(self.find_by_name(name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::setup_test_db;

    #[tokio::test]
    async fn test_create_and_find_team() {
        let (db, _temp) = setup_test_db().await;
        let repo = db.teams();

        let team = Team::new("platform");
        repo.create_team(&team).await.unwrap();

        let found = repo.find_team("platform").await.unwrap().unwrap();
        assert_eq!(found.name, "platform");
        assert_eq!(found.created_at, team.created_at);
        assert!(repo.find_team("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_team_is_typed() {
        let (db, _temp) = setup_test_db().await;
        let repo = db.teams();

        repo.create_team(&Team::new("platform")).await.unwrap();
        let err = repo.create_team(&Team::new("platform")).await.unwrap_err();
        assert!(matches!(err, roster_core::Error::TeamExists(name) if name == "platform"));
    }

    #[tokio::test]
    async fn test_create_with_members_commits_together() {
        let (db, _temp) = setup_test_db().await;
        let repo = db.teams();

        let members = vec![
            User::new("u2", "Bob", "platform", true),
            User::new("u1", "Alice", "platform", false),
        ];
        repo.create_team_with_members(&Team::new("platform"), &members)
            .await
            .unwrap();

        let stored = db.users().list_by_team("platform", false).await.unwrap();
        let ids: Vec<_> = stored.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn test_create_with_members_rolls_back_on_duplicate() {
        let (db, _temp) = setup_test_db().await;
        let repo = db.teams();
        repo.create_team(&Team::new("platform")).await.unwrap();

        let err = repo
            .create_team_with_members(
                &Team::new("platform"),
                &[User::new("u1", "Alice", "platform", true)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, roster_core::Error::TeamExists(_)));
        assert!(db.users().find_by_id("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_with_members_rolls_back_on_member_failure() {
        let (db, _temp) = setup_test_db().await;
        sqlx::query(
            r#"
            CREATE TRIGGER reject_user BEFORE INSERT ON users
            WHEN NEW.id = 'broken'
            BEGIN SELECT RAISE(ABORT, 'rejected'); END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let members = [
            User::new("u1", "Alice", "platform", true),
            User::new("broken", "Broken", "platform", true),
        ];
        let err = db
            .teams()
            .create_team_with_members(&Team::new("platform"), &members)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");

        assert!(db.teams().find_by_name("platform").await.unwrap().is_none());
        assert!(db.users().find_by_id("u1").await.unwrap().is_none());
    }
}
