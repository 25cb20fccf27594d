//! Repository layer over the SQLite roster store.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Keep SQL details away from the draft services.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject corrupt rows with `InvalidData` instead of masking them.
//! - Repositories refuse connections whose schema is not fully migrated.

use crate::db::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::player::PlayerValidationError;
use crate::model::preset::PresetValidationError;
use crate::model::team::PartitionError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod player_repo;
pub mod player_set_repo;
pub mod preset_repo;
pub mod result_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all roster store repositories.
#[derive(Debug)]
pub enum RepoError {
    InvalidPlayer(PlayerValidationError),
    InvalidPreset(PresetValidationError),
    InvalidResult(PartitionError),
    InvalidInput(String),
    Db(DbError),
    Serialization(serde_json::Error),
    NotFound {
        entity: &'static str,
        id: Uuid,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPlayer(err) => write!(f, "{err}"),
            Self::InvalidPreset(err) => write!(f, "{err}"),
            Self::InvalidResult(err) => write!(f, "{err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "snapshot serialization failed: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPlayer(err) => Some(err),
            Self::InvalidPreset(err) => Some(err),
            Self::InvalidResult(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidInput(_)
            | Self::NotFound { .. }
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<PlayerValidationError> for RepoError {
    fn from(value: PlayerValidationError) -> Self {
        Self::InvalidPlayer(value)
    }
}

impl From<PresetValidationError> for RepoError {
    fn from(value: PresetValidationError) -> Self {
        Self::InvalidPreset(value)
    }
}

impl From<PartitionError> for RepoError {
    fn from(value: PartitionError) -> Self {
        Self::InvalidResult(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Rejects connections that did not come through `open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
