//! Draft use-case service.
//!
//! # Responsibility
//! - Load a roster, pick the balancing criterion and run the partitioner.
//! - Attach a fairness report and wrap everything into a replayable result.
//!
//! # Invariants
//! - Every run is driven by one `StdRng` seeded from the recorded `seed`.
//! - Drafting input is ordered by player id, so a seed plus the drafted
//!   players fully determine the teams.
//! - Fairness is only reported for balanced drafts, with the same fallback
//!   the partitioner used.

use crate::draft::{
    evaluate_fairness_with, partition, select_balance_key, BalanceParameters, FairnessConfig,
    MAX_TEAM_COUNT,
};
use crate::model::player::Player;
use crate::model::player_set::PlayerSet;
use crate::model::preset::{DraftSettings, MissingHandling};
use crate::model::result::GeneratedResult;
use crate::model::team::PartitionError;
use crate::repo::RepoError;
use crate::service::roster_service::{Roster, RosterSource};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type DraftResult<T> = Result<T, DraftError>;

/// Service error for draft use-cases.
#[derive(Debug)]
pub enum DraftError {
    /// Roster could not be loaded.
    Roster(RepoError),
    /// Partitioner output broke the completeness invariant.
    InconsistentPartition(PartitionError),
    /// Requested team count is above [`MAX_TEAM_COUNT`].
    TeamCountTooLarge { requested: usize, max: usize },
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Roster(err) => write!(f, "failed to load roster: {err}"),
            Self::InconsistentPartition(err) => write!(f, "inconsistent draft: {err}"),
            Self::TeamCountTooLarge { requested, max } => {
                write!(f, "team count {requested} exceeds the maximum of {max}")
            }
        }
    }
}

impl Error for DraftError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Roster(err) => Some(err),
            Self::InconsistentPartition(err) => Some(err),
            Self::TeamCountTooLarge { .. } => None,
        }
    }
}

impl From<RepoError> for DraftError {
    fn from(value: RepoError) -> Self {
        Self::Roster(value)
    }
}

impl From<PartitionError> for DraftError {
    fn from(value: PartitionError) -> Self {
        Self::InconsistentPartition(value)
    }
}

/// Use-case service that turns a stored roster into teams.
pub struct DraftService<S: RosterSource> {
    roster: S,
}

impl<S: RosterSource> DraftService<S> {
    pub fn new(roster: S) -> Self {
        Self { roster }
    }

    /// Drafts the roster named by `settings`.
    ///
    /// `seed = None` draws a fresh seed from OS-backed entropy.
    pub fn generate(
        &self,
        settings: &DraftSettings,
        seed: Option<u64>,
    ) -> DraftResult<GeneratedResult> {
        let started_at = Instant::now();
        let roster = match self.roster.load_roster(settings.player_set_id) {
            Ok(roster) => roster,
            Err(err) => {
                error!(
                    "event=draft_generate module=service status=error error_code=roster_load_failed error={}",
                    err
                );
                return Err(err.into());
            }
        };

        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let result = draft_roster(&roster, settings, seed)?;
        info!(
            "event=draft_generate module=service status=ok duration_ms={} players={} teams={} balanced={} score={}",
            started_at.elapsed().as_millis(),
            result.players.len(),
            result.teams.len(),
            result.parameters.attribute_key.is_some(),
            result
                .fairness
                .as_ref()
                .map_or_else(|| "none".to_string(), |report| format!("{:.1}", report.score))
        );
        Ok(result)
    }

    /// Drafts again with the previous settings, a freshly loaded roster and
    /// a new seed.
    pub fn reroll(&self, previous: &GeneratedResult) -> DraftResult<GeneratedResult> {
        self.generate(&previous.settings, None)
    }
}

/// Drafts `roster` with `settings`, seeding the run with `seed`. No I/O.
///
/// # Errors
/// - `TeamCountTooLarge` when `settings.team_count > MAX_TEAM_COUNT`.
pub fn draft_roster(
    roster: &Roster,
    settings: &DraftSettings,
    seed: u64,
) -> DraftResult<GeneratedResult> {
    if settings.team_count > MAX_TEAM_COUNT {
        return Err(DraftError::TeamCountTooLarge {
            requested: settings.team_count,
            max: MAX_TEAM_COUNT,
        });
    }
    let players = eligible_players(&roster.players, settings);
    let attribute_key = select_balance_key(&players, &settings.criteria_order);

    let parameters = BalanceParameters {
        team_count: settings.team_count,
        attribute_key,
        fallback_value: settings.fallback_value,
        epsilon: settings.epsilon,
    }
    .normalized();

    run_draft(
        &players,
        parameters,
        settings.clone(),
        roster.player_set.clone(),
        settings.target_gap,
        seed,
    )
}

/// Re-runs a stored result from its own snapshot and seed.
///
/// Produces the same teams as the original run.
pub fn replay(previous: &GeneratedResult) -> DraftResult<GeneratedResult> {
    run_draft(
        &previous.players,
        previous.parameters.clone(),
        previous.settings.clone(),
        previous.player_set.clone(),
        previous.settings.target_gap,
        previous.seed,
    )
}

fn run_draft(
    players: &[Player],
    parameters: BalanceParameters,
    settings: DraftSettings,
    player_set: PlayerSet,
    target_gap: f64,
    seed: u64,
) -> DraftResult<GeneratedResult> {
    let mut ordered = players.to_vec();
    ordered.sort_by_key(|player| player.id);

    let mut rng = StdRng::seed_from_u64(seed);
    let drafted = partition(&ordered, &parameters, &mut rng);
    drafted.validate()?;

    let fairness = parameters.attribute_key.as_deref().map(|key| {
        evaluate_fairness_with(
            &drafted,
            key,
            &FairnessConfig {
                fallback_value: parameters.fallback_value,
                target_gap,
            },
        )
    });

    Ok(GeneratedResult::new(
        seed, parameters, settings, player_set, drafted, fairness,
    ))
}

/// Drops players missing any criterion whose policy is `Exclude`.
fn eligible_players(players: &[Player], settings: &DraftSettings) -> Vec<Player> {
    let excluded_keys: Vec<&str> = settings
        .missing_handling
        .iter()
        .filter(|(_, handling)| **handling == MissingHandling::Exclude)
        .map(|(key, _)| key.as_str())
        .collect();

    if excluded_keys.is_empty() {
        return players.to_vec();
    }

    let eligible: Vec<Player> = players
        .iter()
        .filter(|player| {
            excluded_keys
                .iter()
                .all(|key| has_usable_value(player, key))
        })
        .cloned()
        .collect();
    if eligible.len() != players.len() {
        info!(
            "event=draft_exclusions module=service excluded={}",
            players.len() - eligible.len()
        );
    }
    eligible
}

fn has_usable_value(player: &Player, key: &str) -> bool {
    player.number(key).is_some() || player.category(key).is_some()
}

#[cfg(test)]
mod tests {
    use super::{draft_roster, eligible_players};
    use crate::model::player::Player;
    use crate::model::player_set::DEFAULT_PLAYER_SET_ID;
    use crate::model::preset::{DraftSettings, MissingHandling};
    use crate::service::roster_service::{RosterSource, StaticRoster};

    #[test]
    fn exclude_policy_drops_players_missing_the_key() {
        let players = vec![
            Player::new("Ada").with_number("rating", 80.0),
            Player::new("Bo"),
        ];
        let mut settings = DraftSettings::default();
        settings
            .missing_handling
            .insert("rating".to_string(), MissingHandling::Exclude);

        let eligible = eligible_players(&players, &settings);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].name, "Ada");
    }

    #[test]
    fn category_only_roster_drafts_without_fairness() {
        let roster = StaticRoster::new(vec![
            Player::new("Ada").with_category("position", "Defense"),
            Player::new("Bo").with_category("position", "Forward"),
            Player::new("Cy"),
        ])
        .load_roster(DEFAULT_PLAYER_SET_ID)
        .unwrap();

        let result = draft_roster(&roster, &DraftSettings::default(), 9).unwrap();
        assert_eq!(result.parameters.attribute_key, None);
        assert!(result.fairness.is_none());
        assert_eq!(result.players.len(), 3);
    }
}
