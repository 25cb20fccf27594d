//! Team and partition records produced by one draft run.
//!
//! # Invariants
//! - Every player id referenced by a team appears in exactly one team.
//! - Every referenced id is a key of `players_by_id`, and every key is
//!   referenced by some team.

use super::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One team of a partition. Member order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: Option<String>,
    pub player_ids: Vec<PlayerId>,
}

impl Team {
    /// Creates the empty team at zero-based `index` (`team_1`, `Team 1`, ...).
    pub fn numbered(index: usize) -> Self {
        Self {
            id: format!("team_{}", index + 1),
            name: Some(format!("Team {}", index + 1)),
            player_ids: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.player_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.player_ids.is_empty()
    }
}

/// Broken partition invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// A player id appears in more than one team slot.
    DuplicateAssignment(PlayerId),
    /// A team references an id with no player record.
    UnknownPlayer(PlayerId),
    /// A player record is not assigned to any team.
    Unassigned(PlayerId),
}

impl Display for PartitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateAssignment(id) => write!(f, "player assigned more than once: {id}"),
            Self::UnknownPlayer(id) => write!(f, "team references unknown player: {id}"),
            Self::Unassigned(id) => write!(f, "player not assigned to any team: {id}"),
        }
    }
}

impl Error for PartitionError {}

/// Complete assignment of a roster to teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub teams: Vec<Team>,
    /// Lookup for every drafted player, so callers need not re-query storage.
    pub players_by_id: BTreeMap<PlayerId, Player>,
}

impl Partition {
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn player_count(&self) -> usize {
        self.players_by_id.len()
    }

    /// Resolves a team's members against the lookup, skipping unknown ids.
    pub fn members<'a>(&'a self, team: &'a Team) -> impl Iterator<Item = &'a Player> + 'a {
        team.player_ids
            .iter()
            .filter_map(move |id| self.players_by_id.get(id))
    }

    /// Checks the completeness invariant.
    pub fn validate(&self) -> Result<(), PartitionError> {
        let mut seen = BTreeSet::new();
        for team in &self.teams {
            for id in &team.player_ids {
                if !seen.insert(*id) {
                    return Err(PartitionError::DuplicateAssignment(*id));
                }
                if !self.players_by_id.contains_key(id) {
                    return Err(PartitionError::UnknownPlayer(*id));
                }
            }
        }
        if let Some(id) = self.players_by_id.keys().find(|id| !seen.contains(*id)) {
            return Err(PartitionError::Unassigned(*id));
        }
        Ok(())
    }
}
