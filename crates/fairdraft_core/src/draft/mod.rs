//! Team drafting algorithms.
//!
//! # Responsibility
//! - Split a roster into teams, uniformly or balanced on one numeric criterion.
//! - Score how balanced a partition is and summarize criteria per team.
//!
//! # Invariants
//! - Every function here is pure over its inputs: no I/O, no global state.
//! - Randomness only comes from the caller-supplied `rand::Rng`.
//! - Output partitions hold between [`MIN_TEAM_COUNT`] and [`MAX_TEAM_COUNT`]
//!   teams.

pub mod fairness;
pub mod partition;
pub mod summary;

/// Smallest team count a draft produces; smaller requests are clamped.
pub const MIN_TEAM_COUNT: usize = 2;

/// Largest team count a draft accepts. Services reject larger requests; the
/// algorithms clamp them.
pub const MAX_TEAM_COUNT: usize = 256;

/// Value substituted for players missing the balancing criterion.
pub const DEFAULT_FALLBACK_VALUE: f64 = 60.0;

/// Gap fraction at which the fairness score reaches zero.
pub const DEFAULT_TARGET_GAP: f64 = 0.25;

pub use fairness::{
    evaluate_fairness, evaluate_fairness_with, score_from_gap, FairnessConfig, FairnessReport,
};
pub use partition::{
    assign_greedy, clamp_team_count, effective_value, partition, partition_balanced,
    partition_uniform, select_balance_key, BalanceParameters,
};
pub use summary::{summarize_attribute, summarize_team, summarize_teams, AttributeSummary};
