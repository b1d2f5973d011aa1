//! Team creation and lookup

use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{NewMember, Team, TeamWithMembers};
use crate::service::require;
use crate::store::{TeamStore, UserStore};
use crate::{Error, Result};

#[derive(Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamStore>,
    users: Arc<dyn UserStore>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamStore>, users: Arc<dyn UserStore>) -> Self {
        Self { teams, users }
    }

    /// Create a team and upsert its members into it
    ///
    /// Members that already exist elsewhere are moved to the new team.
    pub async fn create(&self, name: &str, members: Vec<NewMember>) -> Result<TeamWithMembers> {
        let name = require("team_name", name)?;

        let mut seen = HashSet::new();
        for member in &members {
            let id = require("user_id", &member.id)?;
            if !seen.insert(id.to_string()) {
                return Err(Error::InvalidInput(format!(
                    "user {} listed more than once",
                    id
                )));
            }
        }

        if self.teams.find_team(name).await?.is_some() {
            tracing::warn!(team = %name, "Team already exists");
            return Err(Error::TeamExists(name.to_string()));
        }

        let team = Team::new(name);
        let users: Vec<_> = members
            .into_iter()
            .map(|member| {
                NewMember {
                    id: member.id.trim().to_string(),
                    ..member
                }
                .into_user(name)
            })
            .collect();
        self.teams.create_team_with_members(&team, &users).await?;

        let members = self.users.list_team_members(name, false).await?;
        tracing::info!(team = %name, members = members.len(), "Team created");

        Ok(TeamWithMembers { team, members })
    }

    /// Fetch a team with every member, active or not
    pub async fn get_by_name(&self, name: &str) -> Result<TeamWithMembers> {
        let team = self
            .teams
            .find_team(name)
            .await?
            .ok_or_else(|| Error::TeamNotFound(name.to_string()))?;
        let members = self.users.list_team_members(&team.name, false).await?;
        Ok(TeamWithMembers { team, members })
    }
}
