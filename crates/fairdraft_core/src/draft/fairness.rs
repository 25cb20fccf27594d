//! Fairness scoring for a computed partition.
//!
//! The score is a linear penalty on the relative spread of team sums:
//! `100 * (1 - gap_fraction / target_gap)`, clamped to `0..=100`. It is a
//! display heuristic, not a statistical measure.

use super::{DEFAULT_FALLBACK_VALUE, DEFAULT_TARGET_GAP};
use crate::model::player::in_criterion_range;
use crate::model::team::Partition;
use serde::{Deserialize, Serialize};

/// Knobs for [`evaluate_fairness_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessConfig {
    /// Must match the fallback the partition was drafted with.
    pub fallback_value: f64,
    /// Gap fraction that maps to a score of zero.
    pub target_gap: f64,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            fallback_value: DEFAULT_FALLBACK_VALUE,
            target_gap: DEFAULT_TARGET_GAP,
        }
    }
}

/// Balance summary of one partition on one numeric criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessReport {
    pub attribute_key: String,
    /// 0 (gap at or beyond target) to 100 (identical sums).
    pub score: f64,
    /// `max_sum - min_sum`.
    pub spread: f64,
    /// `spread / |average_sum|`, or 0 when the average is 0.
    pub gap_fraction: f64,
    pub min_sum: f64,
    pub max_sum: f64,
    pub average_sum: f64,
    /// Per-team sums, in partition team order.
    pub team_sums: Vec<f64>,
    /// Members without an in-range number for `attribute_key`.
    pub missing_count: usize,
    pub fallback_value: f64,
    pub notes: Vec<String>,
}

/// Scores `partition` on `attribute_key` with the default target gap.
pub fn evaluate_fairness(
    partition: &Partition,
    attribute_key: &str,
    fallback_value: f64,
) -> FairnessReport {
    evaluate_fairness_with(
        partition,
        attribute_key,
        &FairnessConfig {
            fallback_value,
            ..FairnessConfig::default()
        },
    )
}

/// Scores `partition` on `attribute_key`.
pub fn evaluate_fairness_with(
    partition: &Partition,
    attribute_key: &str,
    config: &FairnessConfig,
) -> FairnessReport {
    let fallback_value = if in_criterion_range(config.fallback_value) {
        config.fallback_value
    } else {
        DEFAULT_FALLBACK_VALUE
    };

    let mut missing_count = 0usize;
    let team_sums: Vec<f64> = partition
        .teams
        .iter()
        .map(|team| {
            team.player_ids
                .iter()
                .map(|id| {
                    match partition
                        .players_by_id
                        .get(id)
                        .and_then(|player| player.number(attribute_key))
                    {
                        Some(value) => value,
                        None => {
                            missing_count += 1;
                            fallback_value
                        }
                    }
                })
                .sum::<f64>()
        })
        .collect();

    let (min_sum, max_sum, average_sum) = if team_sums.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let min = team_sums.iter().copied().fold(f64::INFINITY, f64::min);
        let max = team_sums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = team_sums.iter().sum::<f64>() / team_sums.len() as f64;
        (min, max, average)
    };

    let spread = max_sum - min_sum;
    let gap_fraction = if average_sum == 0.0 {
        0.0
    } else {
        spread / average_sum.abs()
    };
    let score = score_from_gap(gap_fraction, config.target_gap);

    let mut notes = Vec::new();
    if missing_count > 0 {
        notes.push(format!(
            "{missing_count} player(s) missing `{attribute_key}`; counted as {fallback_value}"
        ));
    }
    let empty_teams = partition.teams.iter().filter(|team| team.is_empty()).count();
    if empty_teams > 0 {
        notes.push(format!("{empty_teams} team(s) have no players"));
    }
    if score <= 0.0 && spread > 0.0 {
        notes.push(format!(
            "team sums differ by {spread} ({:.0}% of the average)",
            gap_fraction * 100.0
        ));
    }

    FairnessReport {
        attribute_key: attribute_key.to_string(),
        score,
        spread,
        gap_fraction,
        min_sum,
        max_sum,
        average_sum,
        team_sums,
        missing_count,
        fallback_value,
        notes,
    }
}

/// Maps a gap fraction to a 0..=100 score.
///
/// A non-positive or non-finite `target_gap` falls back to the default.
pub fn score_from_gap(gap_fraction: f64, target_gap: f64) -> f64 {
    let target_gap = if target_gap.is_finite() && target_gap > 0.0 {
        target_gap
    } else {
        DEFAULT_TARGET_GAP
    };
    if !gap_fraction.is_finite() {
        return 0.0;
    }
    (100.0 * (1.0 - gap_fraction / target_gap)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::score_from_gap;

    #[test]
    fn score_is_full_at_zero_gap_and_empty_at_target() {
        assert_eq!(score_from_gap(0.0, 0.25), 100.0);
        assert_eq!(score_from_gap(0.25, 0.25), 0.0);
        assert_eq!(score_from_gap(0.9, 0.25), 0.0);
    }

    #[test]
    fn score_is_linear_between_bounds() {
        assert!((score_from_gap(0.125, 0.25) - 50.0).abs() < 1e-9);
        assert!((score_from_gap(0.05, 0.25) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_target_gap_uses_default() {
        assert_eq!(score_from_gap(0.125, 0.0), score_from_gap(0.125, 0.25));
    }
}
