//! Player set repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Membership order is the insertion order (`position` column).
//! - Adding a present member or removing an absent one is a no-op.
//! - The default set is created lazily by `ensure_default_set`.

use super::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::now_epoch_ms;
use crate::model::player::PlayerId;
use crate::model::player_set::{PlayerSet, PlayerSetId, DEFAULT_PLAYER_SET_ID};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for named rosters.
pub trait PlayerSetRepository {
    /// Returns the default set, creating it empty on first use.
    fn ensure_default_set(&self) -> RepoResult<PlayerSet>;
    fn create_set(&self, set: &PlayerSet) -> RepoResult<PlayerSetId>;
    fn get_set(&self, id: PlayerSetId) -> RepoResult<Option<PlayerSet>>;
    fn list_sets(&self) -> RepoResult<Vec<PlayerSet>>;
    fn rename_set(&self, id: PlayerSetId, name: &str) -> RepoResult<()>;
    /// Appends a member. Returns whether the set changed.
    fn add_player(&self, set_id: PlayerSetId, player_id: PlayerId) -> RepoResult<bool>;
    /// Removes a member. Returns whether the set changed.
    fn remove_player(&self, set_id: PlayerSetId, player_id: PlayerId) -> RepoResult<bool>;
    fn delete_set(&self, id: PlayerSetId) -> RepoResult<()>;
}

/// SQLite-backed player set repository.
pub struct SqlitePlayerSetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlayerSetRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn touch_set(&self, id: PlayerSetId) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE player_sets SET updated_at = MAX(updated_at, ?1) WHERE uuid = ?2;",
            params![now_epoch_ms(), id.to_string()],
        )?;
        Ok(())
    }

    fn require_set(&self, id: PlayerSetId) -> RepoResult<()> {
        if self.set_exists(id)? {
            return Ok(());
        }
        Err(RepoError::NotFound {
            entity: "player set",
            id,
        })
    }

    fn set_exists(&self, id: PlayerSetId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM player_sets WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn load_member_ids(&self, id: PlayerSetId) -> RepoResult<Vec<PlayerId>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT player_uuid
             FROM player_set_members
             WHERE set_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            ids.push(parse_uuid(&text, "player_set_members.player_uuid")?);
        }
        Ok(ids)
    }
}

impl PlayerSetRepository for SqlitePlayerSetRepository<'_> {
    fn ensure_default_set(&self) -> RepoResult<PlayerSet> {
        if let Some(existing) = self.get_set(DEFAULT_PLAYER_SET_ID)? {
            return Ok(existing);
        }

        let created = PlayerSet::default_set();
        self.create_set(&created)?;
        info!("event=default_set_created module=repo status=ok");
        Ok(created)
    }

    fn create_set(&self, set: &PlayerSet) -> RepoResult<PlayerSetId> {
        validate_set_name(&set.name)?;
        if set.id.is_nil() {
            return Err(RepoError::InvalidInput("player set id must not be nil".to_string()));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO player_sets (uuid, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                set.id.to_string(),
                set.name.trim(),
                set.created_at,
                set.updated_at,
            ],
        )?;
        for (position, player_id) in set.player_ids.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO player_set_members (set_uuid, player_uuid, position)
                 VALUES (?1, ?2, ?3);",
                params![set.id.to_string(), player_id.to_string(), position as i64],
            )?;
        }
        tx.commit()?;

        Ok(set.id)
    }

    fn get_set(&self, id: PlayerSetId) -> RepoResult<Option<PlayerSet>> {
        let header = self
            .conn
            .query_row(
                "SELECT name, created_at, updated_at FROM player_sets WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((name, created_at, updated_at)) = header else {
            return Ok(None);
        };

        Ok(Some(PlayerSet {
            id,
            name,
            player_ids: self.load_member_ids(id)?,
            created_at,
            updated_at,
        }))
    }

    fn list_sets(&self) -> RepoResult<Vec<PlayerSet>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid FROM player_sets ORDER BY created_at ASC, uuid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            ids.push(parse_uuid(&text, "player_sets.uuid")?);
        }

        let mut sets = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(set) = self.get_set(id)? {
                sets.push(set);
            }
        }
        Ok(sets)
    }

    fn rename_set(&self, id: PlayerSetId, name: &str) -> RepoResult<()> {
        validate_set_name(name)?;
        let changed = self.conn.execute(
            "UPDATE player_sets
             SET name = ?1, updated_at = MAX(updated_at, ?2)
             WHERE uuid = ?3;",
            params![name.trim(), now_epoch_ms(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "player set",
                id,
            });
        }
        Ok(())
    }

    fn add_player(&self, set_id: PlayerSetId, player_id: PlayerId) -> RepoResult<bool> {
        self.require_set(set_id)?;
        let player_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM players WHERE uuid = ?1);",
            [player_id.to_string()],
            |row| row.get(0),
        )?;
        if player_exists != 1 {
            return Err(RepoError::NotFound {
                entity: "player",
                id: player_id,
            });
        }

        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO player_set_members (set_uuid, player_uuid, position)
             SELECT ?1, ?2, COALESCE(MAX(position), -1) + 1
             FROM player_set_members
             WHERE set_uuid = ?1;",
            params![set_id.to_string(), player_id.to_string()],
        )?;
        if changed > 0 {
            self.touch_set(set_id)?;
        }
        Ok(changed > 0)
    }

    fn remove_player(&self, set_id: PlayerSetId, player_id: PlayerId) -> RepoResult<bool> {
        self.require_set(set_id)?;
        let changed = self.conn.execute(
            "DELETE FROM player_set_members WHERE set_uuid = ?1 AND player_uuid = ?2;",
            params![set_id.to_string(), player_id.to_string()],
        )?;
        if changed > 0 {
            self.touch_set(set_id)?;
        }
        Ok(changed > 0)
    }

    fn delete_set(&self, id: PlayerSetId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM player_sets WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "player set",
                id,
            });
        }
        Ok(())
    }
}

fn validate_set_name(name: &str) -> RepoResult<()> {
    if name.trim().is_empty() {
        return Err(RepoError::InvalidInput(
            "player set name must not be blank".to_string(),
        ));
    }
    Ok(())
}
