//! Player set (named roster) model.
//!
//! # Invariants
//! - `player_ids` holds each id at most once, in insertion order.
//! - The default set uses the well-known [`DEFAULT_PLAYER_SET_ID`].

use super::now_epoch_ms;
use super::player::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a player set.
pub type PlayerSetId = Uuid;

/// Id of the roster every new player joins.
pub const DEFAULT_PLAYER_SET_ID: PlayerSetId =
    Uuid::from_u128(0x6661_6972_6472_4166_8000_0000_0000_0001);

/// Display name of the default set.
pub const DEFAULT_PLAYER_SET_NAME: &str = "Default";

/// Named, ordered roster of player ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSet {
    pub id: PlayerSetId,
    pub name: String,
    pub player_ids: Vec<PlayerId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PlayerSet {
    /// Creates an empty set with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates an empty set with a caller-provided id.
    pub fn with_id(id: PlayerSetId, name: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            name: name.into(),
            player_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates the empty default set.
    pub fn default_set() -> Self {
        Self::with_id(DEFAULT_PLAYER_SET_ID, DEFAULT_PLAYER_SET_NAME)
    }

    /// Appends a player if not already present. Returns whether it was added.
    pub fn add_player(&mut self, player_id: PlayerId) -> bool {
        if self.player_ids.contains(&player_id) {
            return false;
        }
        self.player_ids.push(player_id);
        self.updated_at = now_epoch_ms().max(self.updated_at);
        true
    }

    /// Removes a player. Returns whether it was present.
    pub fn remove_player(&mut self, player_id: PlayerId) -> bool {
        let before = self.player_ids.len();
        self.player_ids.retain(|id| *id != player_id);
        let removed = self.player_ids.len() != before;
        if removed {
            self.updated_at = now_epoch_ms().max(self.updated_at);
        }
        removed
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player_ids.contains(&player_id)
    }
}
