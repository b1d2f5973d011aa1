//! Reviewer assignment
//!
//! Picks reviewers for new pull requests and replacement reviewers on
//! reassignment. The selection functions are pure over the member lists
//! they are given and take the random source as an argument, so callers
//! (and tests) decide where randomness comes from.

use std::collections::HashSet;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

use crate::models::{PullRequest, User};
use crate::{Error, Result};

/// Upper bound on reviewers assigned to a pull request
pub const MAX_REVIEWERS: usize = 2;

/// Active members other than the author
pub fn initial_candidates<'a>(author_id: &str, members: &'a [User]) -> Vec<&'a User> {
    members
        .iter()
        .filter(|u| u.is_active && u.id != author_id)
        .collect()
}

/// Pick up to [`MAX_REVIEWERS`] distinct reviewers for a new pull request
pub fn assign_initial<R: Rng + ?Sized>(
    rng: &mut R,
    author_id: &str,
    members: &[User],
) -> Vec<String> {
    let candidates = initial_candidates(author_id, members);
    candidates
        .choose_multiple(rng, MAX_REVIEWERS)
        .map(|u| u.id.clone())
        .collect()
}

/// Active members who are neither the author nor already reviewing `pr`
pub fn replacement_candidates<'a>(pr: &PullRequest, members: &'a [User]) -> Vec<&'a User> {
    let mut excluded: HashSet<&str> = pr.reviewers.iter().map(String::as_str).collect();
    excluded.insert(pr.author_id.as_str());

    members
        .iter()
        .filter(|u| u.is_active && !excluded.contains(u.id.as_str()))
        .collect()
}

/// Choose a replacement for `old_reviewer_id` on `pr`
///
/// Fails with [`Error::PrMerged`] for merged pull requests,
/// [`Error::NotAssigned`] when `old_reviewer_id` is not reviewing `pr`, and
/// [`Error::NoCandidate`] when every active member is excluded.
pub fn select_replacement<R: Rng + ?Sized>(
    rng: &mut R,
    pr: &PullRequest,
    old_reviewer_id: &str,
    members: &[User],
) -> Result<String> {
    if pr.is_merged() {
        return Err(Error::PrMerged(pr.id.clone()));
    }
    if !pr.has_reviewer(old_reviewer_id) {
        return Err(Error::NotAssigned {
            pr_id: pr.id.clone(),
            user_id: old_reviewer_id.to_string(),
        });
    }

    replacement_candidates(pr, members)
        .choose(rng)
        .map(|u| u.id.clone())
        .ok_or_else(|| Error::NoCandidate(pr.id.clone()))
}

/// Swap `old_reviewer_id` for `new_reviewer_id` in place, keeping its slot.
/// Returns the slot index.
pub fn apply_replacement(
    pr: &mut PullRequest,
    old_reviewer_id: &str,
    new_reviewer_id: &str,
) -> Result<usize> {
    let position = pr
        .reviewer_position(old_reviewer_id)
        .ok_or_else(|| Error::NotAssigned {
            pr_id: pr.id.clone(),
            user_id: old_reviewer_id.to_string(),
        })?;
    pr.reviewers[position] = new_reviewer_id.to_string();
    Ok(position)
}

/// Shared random source for the services
///
/// The generator is locked only while a selection runs.
pub struct ReviewerPicker {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl ReviewerPicker {
    /// Picker seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic picker for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Picker over any random source
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Picker from an optional configured seed
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn assign_initial(&self, author_id: &str, members: &[User]) -> Vec<String> {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        assign_initial(&mut **rng, author_id, members)
    }

    pub fn select_replacement(
        &self,
        pr: &PullRequest,
        old_reviewer_id: &str,
        members: &[User],
    ) -> Result<String> {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        select_replacement(&mut **rng, pr, old_reviewer_id, members)
    }
}

impl Default for ReviewerPicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}
