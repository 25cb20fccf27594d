//! Preset repository contracts and SQLite implementation.
//!
//! Presets are stored as a JSON body plus indexed header columns.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::preset::{Preset, PresetId};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for saved draft presets.
pub trait PresetRepository {
    fn create_preset(&self, preset: &Preset) -> RepoResult<PresetId>;
    fn update_preset(&self, preset: &Preset) -> RepoResult<()>;
    fn get_preset(&self, id: PresetId) -> RepoResult<Option<Preset>>;
    /// Lists presets by name, then id.
    fn list_presets(&self) -> RepoResult<Vec<Preset>>;
    fn delete_preset(&self, id: PresetId) -> RepoResult<()>;
}

/// SQLite-backed preset repository.
pub struct SqlitePresetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePresetRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PresetRepository for SqlitePresetRepository<'_> {
    fn create_preset(&self, preset: &Preset) -> RepoResult<PresetId> {
        preset.validate()?;

        self.conn.execute(
            "INSERT INTO presets (uuid, name, player_set_uuid, body_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                preset.id.to_string(),
                preset.name.trim(),
                preset.player_set_id.to_string(),
                serde_json::to_string(preset)?,
                preset.created_at,
                preset.updated_at,
            ],
        )?;

        Ok(preset.id)
    }

    fn update_preset(&self, preset: &Preset) -> RepoResult<()> {
        preset.validate()?;

        let changed = self.conn.execute(
            "UPDATE presets
             SET
                name = ?1,
                player_set_uuid = ?2,
                body_json = ?3,
                updated_at = ?4
             WHERE uuid = ?5;",
            params![
                preset.name.trim(),
                preset.player_set_id.to_string(),
                serde_json::to_string(preset)?,
                preset.updated_at,
                preset.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "preset",
                id: preset.id,
            });
        }
        Ok(())
    }

    fn get_preset(&self, id: PresetId) -> RepoResult<Option<Preset>> {
        let body = self
            .conn
            .query_row(
                "SELECT body_json FROM presets WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        body.map(|text| parse_preset_body(&text)).transpose()
    }

    fn list_presets(&self) -> RepoResult<Vec<Preset>> {
        let mut stmt = self
            .conn
            .prepare("SELECT body_json FROM presets ORDER BY name COLLATE NOCASE ASC, uuid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut presets = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            presets.push(parse_preset_body(&text)?);
        }
        Ok(presets)
    }

    fn delete_preset(&self, id: PresetId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM presets WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "preset",
                id,
            });
        }
        Ok(())
    }
}

fn parse_preset_body(text: &str) -> RepoResult<Preset> {
    let preset: Preset = serde_json::from_str(text)
        .map_err(|err| RepoError::InvalidData(format!("invalid preset body: {err}")))?;
    preset
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("preset {}: {err}", preset.id)))?;
    Ok(preset)
}
