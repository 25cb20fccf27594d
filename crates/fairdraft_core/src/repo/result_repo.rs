//! Generated result library.
//!
//! # Responsibility
//! - Persist draft snapshots so they can be shown again without re-drafting.
//! - Keep the unsaved history bounded via `prune_unsaved`.
//!
//! # Invariants
//! - Snapshots are written and read back whole; a snapshot that no longer
//!   forms a complete partition is rejected.
//! - `seed` is stored as decimal text so the full `u64` range survives.

use super::{bool_to_int, ensure_connection_ready, RepoError, RepoResult};
use crate::model::result::{GeneratedResult, ResultId};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

/// Query options for listing results.
#[derive(Debug, Clone, Default)]
pub struct ResultListQuery {
    pub saved_only: bool,
    pub limit: Option<u32>,
}

/// Repository interface for generated results.
pub trait ResultRepository {
    fn save_result(&self, result: &GeneratedResult) -> RepoResult<ResultId>;
    fn get_result(&self, id: ResultId) -> RepoResult<Option<GeneratedResult>>;
    /// Lists results newest first.
    fn list_results(&self, query: &ResultListQuery) -> RepoResult<Vec<GeneratedResult>>;
    fn mark_saved(&self, id: ResultId, saved: bool) -> RepoResult<()>;
    fn delete_result(&self, id: ResultId) -> RepoResult<()>;
    /// Deletes all but the `keep` newest unsaved results. Returns the count
    /// of deleted rows.
    fn prune_unsaved(&self, keep: u32) -> RepoResult<usize>;
}

/// SQLite-backed result repository.
pub struct SqliteResultRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResultRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ResultRepository for SqliteResultRepository<'_> {
    fn save_result(&self, result: &GeneratedResult) -> RepoResult<ResultId> {
        result.validate()?;
        for player in &result.players {
            player.validate()?;
        }

        self.conn.execute(
            "INSERT INTO results (uuid, created_at, seed, is_saved, snapshot_json)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                result.id.to_string(),
                result.created_at,
                result.seed.to_string(),
                bool_to_int(result.is_saved),
                serde_json::to_string(result)?,
            ],
        )?;

        Ok(result.id)
    }

    fn get_result(&self, id: ResultId) -> RepoResult<Option<GeneratedResult>> {
        let row = self
            .conn
            .query_row(
                "SELECT snapshot_json, is_saved FROM results WHERE uuid = ?1;",
                [id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        row.map(|(text, is_saved)| parse_result_snapshot(&text, is_saved))
            .transpose()
    }

    fn list_results(&self, query: &ResultListQuery) -> RepoResult<Vec<GeneratedResult>> {
        let mut sql = String::from("SELECT snapshot_json, is_saved FROM results WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.saved_only {
            sql.push_str(" AND is_saved = 1");
        }
        sql.push_str(" ORDER BY created_at DESC, uuid ASC");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            let is_saved: i64 = row.get(1)?;
            results.push(parse_result_snapshot(&text, is_saved)?);
        }
        Ok(results)
    }

    fn mark_saved(&self, id: ResultId, saved: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE results SET is_saved = ?1 WHERE uuid = ?2;",
            params![bool_to_int(saved), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "result",
                id,
            });
        }
        Ok(())
    }

    fn delete_result(&self, id: ResultId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM results WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "result",
                id,
            });
        }
        Ok(())
    }

    fn prune_unsaved(&self, keep: u32) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM results
             WHERE is_saved = 0
               AND uuid NOT IN (
                   SELECT uuid
                   FROM results
                   WHERE is_saved = 0
                   ORDER BY created_at DESC, uuid ASC
                   LIMIT ?1
               );",
            [i64::from(keep)],
        )?;
        if deleted > 0 {
            info!(
                "event=results_pruned module=repo status=ok deleted={} kept={}",
                deleted, keep
            );
        }
        Ok(deleted)
    }
}

/// Decodes a snapshot; the `is_saved` column wins over the embedded flag.
fn parse_result_snapshot(text: &str, is_saved: i64) -> RepoResult<GeneratedResult> {
    let mut result: GeneratedResult = serde_json::from_str(text)
        .map_err(|err| RepoError::InvalidData(format!("invalid result snapshot: {err}")))?;
    result.is_saved = match is_saved {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_saved value `{other}` in results.is_saved"
            )));
        }
    };
    result
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("result {}: {err}", result.id)))?;
    Ok(result)
}
