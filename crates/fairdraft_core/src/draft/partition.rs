//! Roster partitioning.
//!
//! # Responsibility
//! - Uniform variant: shuffle, then deal round-robin.
//! - Balanced variant: rank by effective value, then greedily hand each
//!   player to one of the lowest-sum teams.
//!
//! # Invariants
//! - Each input player id lands in exactly one team (duplicate ids in the
//!   input keep their first occurrence).
//! - Team count is `requested` clamped into `MIN_TEAM_COUNT..=MAX_TEAM_COUNT`.
//! - With `epsilon == 0`, the balanced variant always picks a team whose
//!   running sum is the current minimum.

use super::{DEFAULT_FALLBACK_VALUE, MAX_TEAM_COUNT, MIN_TEAM_COUNT};
use crate::model::player::{in_criterion_range, Player, PlayerId};
use crate::model::team::{Partition, Team};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Inputs that decide how a roster is split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceParameters {
    /// Requested team count; clamped to at least 2.
    pub team_count: usize,
    /// Numeric criterion to balance on. `None` selects the uniform variant.
    pub attribute_key: Option<String>,
    /// Substitute for players missing `attribute_key`.
    pub fallback_value: f64,
    /// Slack above the minimum running sum that still counts as "lowest".
    pub epsilon: f64,
}

impl Default for BalanceParameters {
    fn default() -> Self {
        Self {
            team_count: MIN_TEAM_COUNT,
            attribute_key: None,
            fallback_value: DEFAULT_FALLBACK_VALUE,
            epsilon: 0.0,
        }
    }
}

impl BalanceParameters {
    /// Unweighted split into `team_count` teams.
    pub fn uniform(team_count: usize) -> Self {
        Self {
            team_count,
            ..Self::default()
        }
    }

    /// Split balanced on `attribute_key` with zero tolerance.
    pub fn balanced(team_count: usize, attribute_key: impl Into<String>) -> Self {
        Self {
            team_count,
            attribute_key: Some(attribute_key.into()),
            ..Self::default()
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_fallback(mut self, fallback_value: f64) -> Self {
        self.fallback_value = fallback_value;
        self
    }

    /// Returns the parameters the algorithms actually run with.
    pub fn normalized(&self) -> Self {
        Self {
            team_count: self.team_count.clamp(MIN_TEAM_COUNT, MAX_TEAM_COUNT),
            attribute_key: self.attribute_key.clone(),
            fallback_value: normalize_fallback(self.fallback_value),
            epsilon: normalize_epsilon(self.epsilon),
        }
    }
}

/// Applies the team-count bounds.
///
/// Requests outside `MIN_TEAM_COUNT..=MAX_TEAM_COUNT` are clamped rather than
/// rejected.
pub fn clamp_team_count(requested: usize) -> usize {
    let applied = requested.clamp(MIN_TEAM_COUNT, MAX_TEAM_COUNT);
    if applied != requested {
        warn!(
            "event=team_count_clamped module=draft requested={} applied={}",
            requested, applied
        );
    }
    applied
}

/// Returns `player`'s in-range number for `key`, or `fallback`.
pub fn effective_value(player: &Player, key: &str, fallback: f64) -> f64 {
    player.number(key).unwrap_or(fallback)
}

/// Picks the balancing key: the first key in `criteria_order` that is
/// numeric-valued on at least one player.
pub fn select_balance_key(players: &[Player], criteria_order: &[String]) -> Option<String> {
    criteria_order
        .iter()
        .find(|key| players.iter().any(|player| player.number(key).is_some()))
        .cloned()
}

/// Splits `players` according to `params`.
///
/// Dispatches to [`partition_balanced`] when an attribute key is set and to
/// [`partition_uniform`] otherwise.
pub fn partition<R: Rng + ?Sized>(
    players: &[Player],
    params: &BalanceParameters,
    rng: &mut R,
) -> Partition {
    match params.attribute_key.as_deref() {
        Some(key) => partition_balanced(
            players,
            params.team_count,
            key,
            params.fallback_value,
            params.epsilon,
            rng,
        ),
        None => partition_uniform(players, params.team_count, rng),
    }
}

/// Shuffles the roster and deals it round-robin.
///
/// Team sizes differ by at most one.
pub fn partition_uniform<R: Rng + ?Sized>(
    players: &[Player],
    team_count: usize,
    rng: &mut R,
) -> Partition {
    let team_count = clamp_team_count(team_count);
    let mut order = dedupe_roster(players);
    order.shuffle(rng);

    let mut teams = numbered_teams(team_count);
    for (index, player) in order.iter().enumerate() {
        teams[index % team_count].player_ids.push(player.id);
    }

    debug!(
        "event=partition module=draft status=ok variant=uniform players={} teams={}",
        order.len(),
        team_count
    );
    Partition {
        teams,
        players_by_id: index_players(&order),
    }
}

/// Greedy balanced split on the numeric criterion `key`.
///
/// Players are ranked by effective value, highest first. Equal values are
/// ordered by a uniform shuffle before a stable sort, so re-rolls vary among
/// ties. Each ranked player then joins a random team among those whose
/// running sum is within `epsilon` of the current minimum.
pub fn partition_balanced<R: Rng + ?Sized>(
    players: &[Player],
    team_count: usize,
    key: &str,
    fallback_value: f64,
    epsilon: f64,
    rng: &mut R,
) -> Partition {
    let team_count = clamp_team_count(team_count);
    let fallback_value = normalize_fallback(fallback_value);
    let epsilon = normalize_epsilon(epsilon);

    let roster = dedupe_roster(players);
    let mut ranked: Vec<(&Player, f64)> = roster
        .iter()
        .map(|player| (*player, effective_value(player, key, fallback_value)))
        .collect();
    ranked.shuffle(rng);
    ranked.sort_by(|left, right| right.1.total_cmp(&left.1));

    let values: Vec<f64> = ranked.iter().map(|(_, value)| *value).collect();
    let assignment = assign_greedy(&values, team_count, epsilon, rng);

    let mut teams = numbered_teams(team_count);
    for ((player, _), team_index) in ranked.iter().zip(assignment) {
        teams[team_index].player_ids.push(player.id);
    }

    let missing = roster
        .iter()
        .filter(|player| player.number(key).is_none())
        .count();
    debug!(
        "event=partition module=draft status=ok variant=balanced players={} teams={} missing={} epsilon={}",
        roster.len(),
        team_count,
        missing,
        epsilon
    );
    Partition {
        teams,
        players_by_id: index_players(&roster),
    }
}

/// Assigns pre-ranked values to teams and returns the team index per value.
///
/// For each value in order, the candidates are the teams whose running sum
/// is `<= min + epsilon`; one is chosen uniformly at random and its sum grows
/// by the value. Values outside criterion range contribute nothing to the sums.
pub fn assign_greedy<R: Rng + ?Sized>(
    values: &[f64],
    team_count: usize,
    epsilon: f64,
    rng: &mut R,
) -> Vec<usize> {
    let team_count = clamp_team_count(team_count);
    let epsilon = normalize_epsilon(epsilon);
    let mut sums = vec![0.0_f64; team_count];
    let mut candidates = Vec::with_capacity(team_count);
    let mut assignment = Vec::with_capacity(values.len());

    for value in values {
        let min = sums.iter().copied().fold(f64::INFINITY, f64::min);
        candidates.clear();
        candidates.extend((0..team_count).filter(|&index| sums[index] <= min + epsilon));

        let chosen = candidates[rng.random_range(0..candidates.len())];
        if in_criterion_range(*value) {
            sums[chosen] += value;
        }
        assignment.push(chosen);
    }

    assignment
}

fn normalize_epsilon(epsilon: f64) -> f64 {
    if epsilon.is_finite() && epsilon > 0.0 {
        epsilon
    } else {
        0.0
    }
}

fn normalize_fallback(fallback_value: f64) -> f64 {
    if in_criterion_range(fallback_value) {
        fallback_value
    } else {
        DEFAULT_FALLBACK_VALUE
    }
}

fn numbered_teams(team_count: usize) -> Vec<Team> {
    (0..team_count).map(Team::numbered).collect()
}

fn dedupe_roster(players: &[Player]) -> Vec<&Player> {
    let mut seen: BTreeSet<PlayerId> = BTreeSet::new();
    let roster: Vec<&Player> = players
        .iter()
        .filter(|player| seen.insert(player.id))
        .collect();
    if roster.len() != players.len() {
        warn!(
            "event=roster_duplicates module=draft dropped={}",
            players.len() - roster.len()
        );
    }
    roster
}

fn index_players(players: &[&Player]) -> BTreeMap<PlayerId, Player> {
    players
        .iter()
        .map(|player| (player.id, (*player).clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        assign_greedy, clamp_team_count, select_balance_key, BalanceParameters, MAX_TEAM_COUNT,
    };
    use crate::model::player::Player;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn clamp_raises_small_team_counts() {
        assert_eq!(clamp_team_count(0), 2);
        assert_eq!(clamp_team_count(1), 2);
        assert_eq!(clamp_team_count(5), 5);
        assert_eq!(clamp_team_count(MAX_TEAM_COUNT), MAX_TEAM_COUNT);
        assert_eq!(clamp_team_count(usize::MAX), MAX_TEAM_COUNT);
    }

    #[test]
    fn normalized_parameters_reject_negative_epsilon() {
        let params = BalanceParameters::balanced(1, "rating")
            .with_epsilon(-3.0)
            .with_fallback(f64::NAN)
            .normalized();
        assert_eq!(params.team_count, 2);
        assert_eq!(params.epsilon, 0.0);
        assert_eq!(params.fallback_value, 60.0);
    }

    #[test]
    fn select_balance_key_skips_category_only_keys() {
        let players = vec![
            Player::new("Ada").with_category("gender", "female"),
            Player::new("Bo").with_number("rating", 70.0),
        ];
        let order = vec!["gender".to_string(), "rating".to_string()];
        assert_eq!(
            select_balance_key(&players, &order),
            Some("rating".to_string())
        );
        assert_eq!(select_balance_key(&players, &["gender".to_string()]), None);
    }

    #[test]
    fn assign_greedy_fills_every_team_before_stacking() {
        let mut rng = StdRng::seed_from_u64(11);
        let assignment = assign_greedy(&[5.0, 5.0, 5.0], 3, 0.0, &mut rng);
        let mut sorted = assignment.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn assign_greedy_ignores_non_finite_values() {
        let mut rng = StdRng::seed_from_u64(3);
        let assignment = assign_greedy(&[f64::NAN, 10.0, f64::INFINITY, 1.0], 2, 0.0, &mut rng);
        assert_eq!(assignment.len(), 4);
    }
}
