//! Roster use-case service.
//!
//! # Responsibility
//! - Provide the roster-loading seam the draft service consumes.
//! - Keep default-set membership in sync with player creation and removal.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Loading a roster returns players in set order and skips dangling ids.

use crate::model::player::{CriterionValue, Player, PlayerId};
use crate::model::player_set::{PlayerSet, PlayerSetId, DEFAULT_PLAYER_SET_ID};
use crate::repo::player_repo::PlayerRepository;
use crate::repo::player_set_repo::PlayerSetRepository;
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};

/// A player set together with its resolved players.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub player_set: PlayerSet,
    pub players: Vec<Player>,
}

/// Source of rosters for drafting.
///
/// The draft core does not know where rosters live; storage-backed and
/// in-memory implementations both plug in here.
pub trait RosterSource {
    fn load_roster(&self, set_id: PlayerSetId) -> RepoResult<Roster>;
}

/// Fixed in-memory roster, for embedding and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticRoster {
    roster: Roster,
}

impl StaticRoster {
    /// Wraps `players` in a default set listing them in order.
    pub fn new(players: Vec<Player>) -> Self {
        let mut player_set = PlayerSet::default_set();
        for player in &players {
            player_set.add_player(player.id);
        }
        Self {
            roster: Roster {
                player_set,
                players,
            },
        }
    }
}

impl RosterSource for StaticRoster {
    fn load_roster(&self, set_id: PlayerSetId) -> RepoResult<Roster> {
        if set_id != self.roster.player_set.id {
            return Err(RepoError::NotFound {
                entity: "player set",
                id: set_id,
            });
        }
        Ok(self.roster.clone())
    }
}

/// Use-case service for roster editing.
pub struct RosterService<P: PlayerRepository, S: PlayerSetRepository> {
    players: P,
    sets: S,
}

impl<P: PlayerRepository, S: PlayerSetRepository> RosterService<P, S> {
    pub fn new(players: P, sets: S) -> Self {
        Self { players, sets }
    }

    /// Creates a player and appends it to the default set.
    ///
    /// Either both writes land or neither does.
    pub fn add_player(&self, player: &Player) -> RepoResult<PlayerId> {
        let id = self
            .players
            .create_player_in_set(player, DEFAULT_PLAYER_SET_ID)?;
        info!("event=player_added module=service status=ok");
        Ok(id)
    }

    /// Creates a player from a name and editor field values.
    pub fn create_player(
        &self,
        name: &str,
        fields: &[(&str, CriterionValue)],
    ) -> RepoResult<PlayerId> {
        let mut player = Player::new(name.trim());
        for (key, value) in fields {
            player.set_criterion(key, value.clone());
        }
        self.add_player(&player)
    }

    /// Removes a player from the default set. The player record is kept.
    pub fn remove_from_default_set(&self, player_id: PlayerId) -> RepoResult<bool> {
        self.sets.ensure_default_set()?;
        self.sets.remove_player(DEFAULT_PLAYER_SET_ID, player_id)
    }

    /// Persists an edited player, bumping `updated_at`.
    pub fn update_player(&self, player: &Player) -> RepoResult<()> {
        let mut updated = player.clone();
        updated.name = updated.name.trim().to_string();
        updated.touch();
        self.players.update_player(&updated)
    }

    pub fn get_player(&self, id: PlayerId) -> RepoResult<Option<Player>> {
        self.players.get_player(id)
    }

    pub fn list_players(&self) -> RepoResult<Vec<Player>> {
        self.players.list_players()
    }

    /// Deletes a player everywhere, including set memberships.
    pub fn delete_player(&self, id: PlayerId) -> RepoResult<()> {
        self.players.delete_player(id)
    }
}

impl<P: PlayerRepository, S: PlayerSetRepository> RosterSource for RosterService<P, S> {
    fn load_roster(&self, set_id: PlayerSetId) -> RepoResult<Roster> {
        let player_set = if set_id == DEFAULT_PLAYER_SET_ID {
            self.sets.ensure_default_set()?
        } else {
            self.sets.get_set(set_id)?.ok_or(RepoError::NotFound {
                entity: "player set",
                id: set_id,
            })?
        };

        let players = self.players.get_players(&player_set.player_ids)?;
        if players.len() != player_set.player_ids.len() {
            warn!(
                "event=roster_load module=service status=partial expected={} loaded={}",
                player_set.player_ids.len(),
                players.len()
            );
        }
        Ok(Roster {
            player_set,
            players,
        })
    }
}
