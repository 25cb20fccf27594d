//! Domain model for rosters, draft configuration and generated results.
//!
//! # Responsibility
//! - Define canonical records shared by the draft algorithms and the store.
//! - Keep player attributes as a typed, open-ended criteria map.
//!
//! # Invariants
//! - Every stored record is identified by a stable, non-nil uuid.
//! - Timestamps are Unix epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod player;
pub mod player_set;
pub mod preset;
pub mod result;
pub mod team;

/// Returns the current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock is set before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
