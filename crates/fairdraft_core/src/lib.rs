//! Core logic for FairDraft: split a roster into teams that are balanced on
//! one numeric criterion, score the result, and keep rosters and results in
//! a local SQLite store.

pub mod db;
pub mod draft;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use draft::{
    evaluate_fairness, evaluate_fairness_with, partition, partition_balanced, partition_uniform,
    AttributeSummary, BalanceParameters, FairnessConfig, FairnessReport,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::player::{CriterionValue, Player, PlayerId, PlayerValidationError};
pub use model::player_set::{PlayerSet, PlayerSetId, DEFAULT_PLAYER_SET_ID};
pub use model::preset::{DraftSettings, MissingHandling, Preset, PresetId};
pub use model::result::{GeneratedResult, ResultId};
pub use model::team::{Partition, PartitionError, Team};
pub use repo::player_repo::{PlayerRepository, SqlitePlayerRepository};
pub use repo::player_set_repo::{PlayerSetRepository, SqlitePlayerSetRepository};
pub use repo::preset_repo::{PresetRepository, SqlitePresetRepository};
pub use repo::result_repo::{ResultListQuery, ResultRepository, SqliteResultRepository};
pub use repo::{RepoError, RepoResult};
pub use service::draft_service::{draft_roster, replay, DraftError, DraftResult, DraftService};
pub use service::roster_service::{Roster, RosterService, RosterSource, StaticRoster};

/// Minimal health-check API for embedding shells.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
