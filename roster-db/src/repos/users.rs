//! User repository

use async_trait::async_trait;
use roster_core::store::UserStore;
use roster_core::User;
use sqlx::SqlitePool;

use crate::error::Result;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    is_active: bool,
    team_name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            is_active: row.is_active,
            team_name: row.team_name,
        }
    }
}

const SELECT_USER: &str = "SELECT id, name, is_active, team_name FROM users";

pub(crate) const UPSERT_USER: &str = r#"
    INSERT INTO users (id, name, is_active, team_name)
    VALUES (?, ?, ?, ?)
    ON CONFLICT (id) DO UPDATE SET
        name = excluded.name,
        is_active = excluded.is_active,
        team_name = excluded.team_name
"#;

/// Repository for users
#[derive(Clone)]
pub struct UsersRepo {
    pool: SqlitePool,
}

impl UsersRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user, or overwrite name, active flag and team of an existing one
    pub async fn upsert(&self, user: &User) -> Result<()> {
        sqlx::query(UPSERT_USER)
            .bind(&user.id)
            .bind(&user.name)
            .bind(user.is_active)
            .bind(&user.team_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = ?", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    /// List members of a team, optionally only active ones
    pub async fn list_by_team(&self, team_name: &str, active_only: bool) -> Result<Vec<User>> {
        let query = if active_only {
            format!("{} WHERE team_name = ? AND is_active = 1 ORDER BY id", SELECT_USER)
        } else {
            format!("{} WHERE team_name = ? ORDER BY id", SELECT_USER)
        };

        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(team_name)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// List every user
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY id", SELECT_USER))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Set the active flag, returning the updated user if it exists
    pub async fn set_active(&self, id: &str, active: bool) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET is_active = ? WHERE id = ? RETURNING id, name, is_active, team_name",
        )
        .bind(active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl UserStore for UsersRepo {
    async fn upsert_user(&self, user: &User) -> roster_core::Result<()> {
        Ok(self.upsert(user).await?)
    }

    async fn get_user(&self, id: &str) -> roster_core::Result<Option<User>> {
        Ok(self.find_by_id(id).await?)
    }

    async fn list_team_members(
        &self,
        team_name: &str,
        active_only: bool,
    ) -> roster_core::Result<Vec<User>> {
        Ok(self.list_by_team(team_name, active_only).await?)
    }

    async fn list_users(&self) -> roster_core::Result<Vec<User>> {
        Ok(self.list_all().await?)
    }

    async fn set_user_active(&self, id: &str, active: bool) -> roster_core::Result<Option<User>> {
        Ok(self.set_active(id, active).await?)
    }
}
