//! Player repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `players` table.
//! - Store criteria as a JSON object keyed by criterion name.
//!
//! # Invariants
//! - Write paths call `Player::validate()` before SQL mutations.
//! - `create_player_in_set` writes the player and its membership atomically.
//! - Stored criteria entries that are malformed or non-finite read back as
//!   absent; every other row defect is surfaced as `InvalidData`.

use super::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::now_epoch_ms;
use crate::model::player::{in_criterion_range, CriterionValue, Player, PlayerId};
use crate::model::player_set::{PlayerSet, PlayerSetId, DEFAULT_PLAYER_SET_ID};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;

const PLAYER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    criteria_json,
    created_at,
    updated_at
FROM players";

/// Repository interface for roster players.
pub trait PlayerRepository {
    fn create_player(&self, player: &Player) -> RepoResult<PlayerId>;
    /// Creates a player and appends it to `set_id` in one transaction.
    ///
    /// The default set is created on demand; any other set must exist.
    fn create_player_in_set(
        &self,
        player: &Player,
        set_id: PlayerSetId,
    ) -> RepoResult<PlayerId>;
    fn update_player(&self, player: &Player) -> RepoResult<()>;
    fn get_player(&self, id: PlayerId) -> RepoResult<Option<Player>>;
    /// Loads players in `ids` order, skipping ids with no row.
    fn get_players(&self, ids: &[PlayerId]) -> RepoResult<Vec<Player>>;
    /// Lists all players by name, then id.
    fn list_players(&self) -> RepoResult<Vec<Player>>;
    /// Deletes a player and its set memberships.
    fn delete_player(&self, id: PlayerId) -> RepoResult<()>;
}

/// SQLite-backed player repository.
pub struct SqlitePlayerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlayerRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PlayerRepository for SqlitePlayerRepository<'_> {
    fn create_player(&self, player: &Player) -> RepoResult<PlayerId> {
        player.validate()?;
        insert_player(self.conn, player)?;
        Ok(player.id)
    }

    fn create_player_in_set(
        &self,
        player: &Player,
        set_id: PlayerSetId,
    ) -> RepoResult<PlayerId> {
        player.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        if set_id == DEFAULT_PLAYER_SET_ID {
            let default_set = PlayerSet::default_set();
            tx.execute(
                "INSERT OR IGNORE INTO player_sets (uuid, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    default_set.id.to_string(),
                    default_set.name,
                    default_set.created_at,
                    default_set.updated_at,
                ],
            )?;
        }

        let touched = tx.execute(
            "UPDATE player_sets SET updated_at = MAX(updated_at, ?1) WHERE uuid = ?2;",
            params![now_epoch_ms(), set_id.to_string()],
        )?;
        if touched == 0 {
            return Err(RepoError::NotFound {
                entity: "player set",
                id: set_id,
            });
        }

        insert_player(&tx, player)?;
        tx.execute(
            "INSERT INTO player_set_members (set_uuid, player_uuid, position)
             SELECT ?1, ?2, COALESCE(MAX(position), -1) + 1
             FROM player_set_members
             WHERE set_uuid = ?1;",
            params![set_id.to_string(), player.id.to_string()],
        )?;
        tx.commit()?;

        Ok(player.id)
    }

    fn update_player(&self, player: &Player) -> RepoResult<()> {
        player.validate()?;

        let changed = self.conn.execute(
            "UPDATE players
             SET
                name = ?1,
                criteria_json = ?2,
                updated_at = ?3
             WHERE uuid = ?4;",
            params![
                player.name.trim(),
                serde_json::to_string(&player.criteria)?,
                player.updated_at,
                player.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "player",
                id: player.id,
            });
        }

        Ok(())
    }

    fn get_player(&self, id: PlayerId) -> RepoResult<Option<Player>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{PLAYER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let player = stmt
            .query_row([id.to_string()], |row| Ok(parse_player_row(row)))
            .optional()?;
        player.transpose()
    }

    fn get_players(&self, ids: &[PlayerId]) -> RepoResult<Vec<Player>> {
        let mut players = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(player) = self.get_player(*id)? {
                players.push(player);
            }
        }
        Ok(players)
    }

    fn list_players(&self) -> RepoResult<Vec<Player>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PLAYER_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut players = Vec::new();

        while let Some(row) = rows.next()? {
            players.push(parse_player_row(row)?);
        }

        Ok(players)
    }

    fn delete_player(&self, id: PlayerId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM players WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "player",
                id,
            });
        }

        Ok(())
    }
}

fn insert_player(conn: &Connection, player: &Player) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO players (uuid, name, criteria_json, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            player.id.to_string(),
            player.name.trim(),
            serde_json::to_string(&player.criteria)?,
            player.created_at,
            player.updated_at,
        ],
    )?;
    Ok(())
}

fn parse_player_row(row: &Row<'_>) -> RepoResult<Player> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "players.uuid")?;
    let criteria_text: String = row.get("criteria_json")?;

    let player = Player {
        id,
        name: row.get("name")?,
        criteria: parse_criteria(id, &criteria_text)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    player
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("player {id}: {err}")))?;
    Ok(player)
}

fn parse_criteria(id: PlayerId, text: &str) -> RepoResult<BTreeMap<String, CriterionValue>> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(text).map_err(|err| {
        RepoError::InvalidData(format!("invalid criteria object for player {id}: {err}"))
    })?;

    let mut criteria = BTreeMap::new();
    for (key, value) in raw {
        match serde_json::from_value::<CriterionValue>(value) {
            Ok(CriterionValue::Number(number)) if !in_criterion_range(number) => {
                warn!("event=criterion_dropped module=repo reason=out_of_range player={id}");
            }
            Ok(CriterionValue::Category(label)) if label.trim().is_empty() => {
                warn!("event=criterion_dropped module=repo reason=blank_category player={id}");
            }
            Ok(criterion) if !key.trim().is_empty() => {
                criteria.insert(key, criterion);
            }
            Ok(_) | Err(_) => {
                warn!("event=criterion_dropped module=repo reason=malformed player={id}");
            }
        }
    }
    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::parse_criteria;
    use crate::model::player::CriterionValue;
    use uuid::Uuid;

    #[test]
    fn malformed_criteria_entries_read_as_absent() {
        let criteria = parse_criteria(
            Uuid::new_v4(),
            r#"{
                "rating": {"type": "number", "value": 71.5},
                "speed": {"type": "number", "value": null},
                "gender": {"type": "category", "value": ""},
                "position": {"type": "category", "value": "Midfield"},
                "legacy": 42
            }"#,
        )
        .unwrap();

        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria.get("rating"), Some(&CriterionValue::Number(71.5)));
        assert_eq!(
            criteria.get("position"),
            Some(&CriterionValue::Category("Midfield".to_string()))
        );
    }

    #[test]
    fn non_object_criteria_is_invalid_data() {
        assert!(parse_criteria(Uuid::new_v4(), "[1, 2]").is_err());
    }
}
