//! Generated draft result snapshot.
//!
//! # Invariants
//! - A result is self-contained: it carries the exact parameters, settings
//!   and player snapshots it was drafted from, so it can be shown again
//!   without re-running randomized logic.
//! - `teams` and `players` satisfy the partition completeness invariant.

use super::now_epoch_ms;
use super::player::{Player, PlayerId};
use super::player_set::PlayerSet;
use super::preset::DraftSettings;
use super::team::{Partition, PartitionError, Team};
use crate::draft::{BalanceParameters, FairnessReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier for a generated result.
pub type ResultId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResult {
    pub id: ResultId,
    pub created_at: i64,
    /// Seed of the `StdRng` the draft ran with.
    pub seed: u64,
    /// Parameters the partitioner actually ran with (post-normalization).
    pub parameters: BalanceParameters,
    pub settings: DraftSettings,
    pub player_set: PlayerSet,
    /// Players that were drafted (after any exclusions).
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    /// Present only for balanced drafts.
    pub fairness: Option<FairnessReport>,
    pub is_saved: bool,
}

impl GeneratedResult {
    /// Wraps a fresh partition into an unsaved result.
    pub fn new(
        seed: u64,
        parameters: BalanceParameters,
        settings: DraftSettings,
        player_set: PlayerSet,
        partition: Partition,
        fairness: Option<FairnessReport>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now_epoch_ms(),
            seed,
            parameters,
            settings,
            player_set,
            players: partition.players_by_id.into_values().collect(),
            teams: partition.teams,
            fairness,
            is_saved: false,
        }
    }

    /// Rebuilds the partition view from the stored snapshot.
    pub fn partition(&self) -> Partition {
        Partition {
            teams: self.teams.clone(),
            players_by_id: self
                .players
                .iter()
                .map(|player| (player.id, player.clone()))
                .collect::<BTreeMap<PlayerId, Player>>(),
        }
    }

    /// Checks that the snapshot still describes a complete partition.
    pub fn validate(&self) -> Result<(), PartitionError> {
        self.partition().validate()
    }
}
