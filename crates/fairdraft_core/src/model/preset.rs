//! Draft configuration: ad-hoc settings and saved presets.

use super::now_epoch_ms;
use super::player::in_criterion_range;
use super::player_set::{PlayerSetId, DEFAULT_PLAYER_SET_ID};
use crate::draft::MAX_TEAM_COUNT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a preset.
pub type PresetId = Uuid;

/// How a draft treats players that lack a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingHandling {
    /// Keep the player; numeric balancing substitutes the fallback value.
    #[default]
    AllowUnknown,
    /// Leave the player out of the draft.
    Exclude,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresetValidationError {
    NilId,
    BlankName,
    InvalidEpsilon(f64),
    InvalidFallback(f64),
    TeamCountTooLarge(usize),
}

impl Display for PresetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "preset id must not be nil"),
            Self::BlankName => write!(f, "preset name must not be blank"),
            Self::InvalidEpsilon(value) => {
                write!(f, "epsilon must be a finite value >= 0, got {value}")
            }
            Self::InvalidFallback(value) => {
                write!(f, "fallback value must be a finite criterion value, got {value}")
            }
            Self::TeamCountTooLarge(value) => {
                write!(f, "team count must be at most {MAX_TEAM_COUNT}, got {value}")
            }
        }
    }
}

impl Error for PresetValidationError {}

/// Named draft configuration bound to one player set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    pub player_set_id: PlayerSetId,
    /// Requested team count; drafting clamps values below 2.
    pub team_count: usize,
    /// Criteria keys in priority order. The first numeric one is balanced.
    pub criteria_order: Vec<String>,
    #[serde(default)]
    pub missing_handling: BTreeMap<String, MissingHandling>,
    pub epsilon: f64,
    pub fallback_value: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Preset {
    pub fn new(name: impl Into<String>, player_set_id: PlayerSetId, team_count: usize) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            player_set_id,
            team_count,
            criteria_order: Vec::new(),
            missing_handling: BTreeMap::new(),
            epsilon: 0.0,
            fallback_value: crate::draft::DEFAULT_FALLBACK_VALUE,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), PresetValidationError> {
        if self.id.is_nil() {
            return Err(PresetValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(PresetValidationError::BlankName);
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(PresetValidationError::InvalidEpsilon(self.epsilon));
        }
        if !in_criterion_range(self.fallback_value) {
            return Err(PresetValidationError::InvalidFallback(self.fallback_value));
        }
        if self.team_count > MAX_TEAM_COUNT {
            return Err(PresetValidationError::TeamCountTooLarge(self.team_count));
        }
        Ok(())
    }

    /// Missing-value policy for `key`; defaults to `AllowUnknown`.
    pub fn missing_handling_for(&self, key: &str) -> MissingHandling {
        self.missing_handling.get(key).copied().unwrap_or_default()
    }
}

/// Settings for one draft run.
///
/// Snapshotted into every generated result so the run can be displayed or
/// replayed later without the preset it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSettings {
    pub player_set_id: PlayerSetId,
    /// Requested team count; values below 2 are clamped to 2.
    pub team_count: usize,
    /// Criteria keys in priority order. The first key that is numeric on at
    /// least one rostered player becomes the balancing attribute.
    pub criteria_order: Vec<String>,
    #[serde(default)]
    pub missing_handling: BTreeMap<String, MissingHandling>,
    pub epsilon: f64,
    pub fallback_value: f64,
    pub target_gap: f64,
}

impl Default for DraftSettings {
    fn default() -> Self {
        Self {
            player_set_id: DEFAULT_PLAYER_SET_ID,
            team_count: 2,
            criteria_order: vec![
                "rating".to_string(),
                "gender".to_string(),
                "position".to_string(),
            ],
            missing_handling: BTreeMap::new(),
            epsilon: DEFAULT_DRAFT_EPSILON,
            fallback_value: crate::draft::DEFAULT_FALLBACK_VALUE,
            target_gap: crate::draft::DEFAULT_TARGET_GAP,
        }
    }
}

/// Epsilon used by the setup screen until the user changes it.
pub const DEFAULT_DRAFT_EPSILON: f64 = 5.0;

impl DraftSettings {
    /// Builds run settings from a saved preset.
    pub fn from_preset(preset: &Preset) -> Self {
        Self {
            player_set_id: preset.player_set_id,
            team_count: preset.team_count,
            criteria_order: preset.criteria_order.clone(),
            missing_handling: preset.missing_handling.clone(),
            epsilon: preset.epsilon,
            fallback_value: preset.fallback_value,
            ..Self::default()
        }
    }

    /// Missing-value policy for `key`; defaults to `AllowUnknown`.
    pub fn missing_handling_for(&self, key: &str) -> MissingHandling {
        self.missing_handling.get(key).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{DraftSettings, MissingHandling, Preset, PresetValidationError};
    use crate::draft::MAX_TEAM_COUNT;
    use crate::model::player_set::DEFAULT_PLAYER_SET_ID;

    #[test]
    fn validate_rejects_negative_epsilon() {
        let mut preset = Preset::new("league night", DEFAULT_PLAYER_SET_ID, 3);
        preset.epsilon = -1.0;
        assert_eq!(
            preset.validate(),
            Err(PresetValidationError::InvalidEpsilon(-1.0))
        );
    }

    #[test]
    fn validate_rejects_oversized_team_count() {
        let preset = Preset::new("stadium", DEFAULT_PLAYER_SET_ID, MAX_TEAM_COUNT + 1);
        assert_eq!(
            preset.validate(),
            Err(PresetValidationError::TeamCountTooLarge(MAX_TEAM_COUNT + 1))
        );
        assert!(Preset::new("stadium", DEFAULT_PLAYER_SET_ID, MAX_TEAM_COUNT)
            .validate()
            .is_ok());
    }

    #[test]
    fn settings_from_preset_copy_balancing_fields() {
        let mut preset = Preset::new("league night", DEFAULT_PLAYER_SET_ID, 4);
        preset.criteria_order = vec!["rating".to_string()];
        preset.epsilon = 2.5;
        preset
            .missing_handling
            .insert("rating".to_string(), MissingHandling::Exclude);

        let settings = DraftSettings::from_preset(&preset);
        assert_eq!(settings.team_count, 4);
        assert_eq!(settings.epsilon, 2.5);
        assert_eq!(settings.missing_handling_for("rating"), MissingHandling::Exclude);
        assert_eq!(settings.missing_handling_for("gender"), MissingHandling::AllowUnknown);
        assert_eq!(settings.target_gap, crate::draft::DEFAULT_TARGET_GAP);
    }
}
