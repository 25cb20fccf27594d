//! Player domain model.
//!
//! # Responsibility
//! - Define the roster record consumed by the draft algorithms.
//! - Provide typed accessors over the open-ended criteria map.
//!
//! # Invariants
//! - `id` is stable and never the nil uuid.
//! - `name` is non-blank after trimming.
//! - Number criteria are finite and within [`MAX_CRITERION_MAGNITUDE`];
//!   category labels are non-blank.
//! - `updated_at` is never earlier than `created_at`.

use super::now_epoch_ms;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a roster player.
pub type PlayerId = Uuid;

/// Category label the editor uses for "no value".
pub const UNSPECIFIED_CATEGORY: &str = "unspecified";

/// Largest absolute value a number criterion may hold.
///
/// Keeps team sums finite for any realistic roster, so fairness reports and
/// stored snapshots never carry `inf` or `NaN`.
pub const MAX_CRITERION_MAGNITUDE: f64 = 1e15;

/// Whether `value` is usable as a number criterion or fallback value.
pub fn in_criterion_range(value: f64) -> bool {
    value.is_finite() && value.abs() <= MAX_CRITERION_MAGNITUDE
}

/// Typed value of one player criterion.
///
/// Serialized as `{"type": "number" | "category", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CriterionValue {
    Number(f64),
    Category(String),
}

impl CriterionValue {
    /// Returns the numeric payload when it is a number in criterion range.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if in_criterion_range(*value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the category label, if category-valued.
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Category(label) => Some(label.as_str()),
            Self::Number(_) => None,
        }
    }
}

/// Validation failures for [`Player`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerValidationError {
    NilId,
    BlankName,
    BlankCriterionKey,
    NumberOutOfRange { key: String, value: f64 },
    BlankCategory { key: String },
    InvalidTimestamps { created_at: i64, updated_at: i64 },
}

impl Display for PlayerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "player id must not be nil"),
            Self::BlankName => write!(f, "player name must not be blank"),
            Self::BlankCriterionKey => write!(f, "criterion key must not be blank"),
            Self::NumberOutOfRange { key, value } => write!(
                f,
                "criterion `{key}` must be a finite number within ±{MAX_CRITERION_MAGNITUDE:e}, got {value}"
            ),
            Self::BlankCategory { key } => {
                write!(f, "criterion `{key}` must not be an empty category")
            }
            Self::InvalidTimestamps {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
        }
    }
}

impl Error for PlayerValidationError {}

/// Roster record.
///
/// Deserialization runs [`Player::validate`], so a decoded player is always
/// well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlayerFields")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Attribute key -> typed value. Absence means "unknown", never zero.
    pub criteria: BTreeMap<String, CriterionValue>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Deserialize)]
struct PlayerFields {
    id: PlayerId,
    name: String,
    #[serde(default)]
    criteria: BTreeMap<String, CriterionValue>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PlayerFields> for Player {
    type Error = PlayerValidationError;

    fn try_from(value: PlayerFields) -> Result<Self, Self::Error> {
        let player = Self {
            id: value.id,
            name: value.name,
            criteria: value.criteria,
            created_at: value.created_at,
            updated_at: value.updated_at,
        };
        player.validate()?;
        Ok(player)
    }
}

impl Player {
    /// Creates a player with a generated id and no criteria.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            criteria: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a player with a caller-provided id.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(id: PlayerId, name: impl Into<String>) -> Result<Self, PlayerValidationError> {
        if id.is_nil() {
            return Err(PlayerValidationError::NilId);
        }
        let mut player = Self::new(name);
        player.id = id;
        Ok(player)
    }

    /// Builder-style helper that sets one criterion.
    pub fn with_criterion(mut self, key: impl Into<String>, value: CriterionValue) -> Self {
        self.criteria.insert(key.into(), value);
        self
    }

    /// Builder-style helper for number criteria.
    pub fn with_number(self, key: impl Into<String>, value: f64) -> Self {
        self.with_criterion(key, CriterionValue::Number(value))
    }

    /// Builder-style helper for category criteria.
    pub fn with_category(self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.with_criterion(key, CriterionValue::Category(label.into()))
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), PlayerValidationError> {
        if self.id.is_nil() {
            return Err(PlayerValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(PlayerValidationError::BlankName);
        }
        for (key, value) in &self.criteria {
            if key.trim().is_empty() {
                return Err(PlayerValidationError::BlankCriterionKey);
            }
            match value {
                CriterionValue::Number(number) if !in_criterion_range(*number) => {
                    return Err(PlayerValidationError::NumberOutOfRange {
                        key: key.clone(),
                        value: *number,
                    });
                }
                CriterionValue::Category(label) if label.trim().is_empty() => {
                    return Err(PlayerValidationError::BlankCategory { key: key.clone() });
                }
                _ => {}
            }
        }
        if self.updated_at < self.created_at {
            return Err(PlayerValidationError::InvalidTimestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Returns the number stored under `key`.
    ///
    /// Category values and numbers outside criterion range read as absent.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.criteria.get(key).and_then(CriterionValue::as_number)
    }

    /// Returns the category label stored under `key`.
    pub fn category(&self, key: &str) -> Option<&str> {
        self.criteria.get(key).and_then(CriterionValue::as_category)
    }

    /// Applies one editor field value.
    ///
    /// Empty input and the `unspecified` label clear the key instead of
    /// storing a sentinel. Bumps `updated_at`.
    pub fn set_criterion(&mut self, key: &str, value: CriterionValue) {
        let clears = match &value {
            CriterionValue::Category(label) => {
                let trimmed = label.trim();
                trimmed.is_empty() || trimmed == UNSPECIFIED_CATEGORY
            }
            CriterionValue::Number(_) => false,
        };
        if clears {
            self.criteria.remove(key);
        } else {
            self.criteria.insert(key.to_string(), value);
        }
        self.touch();
    }

    /// Removes a criterion. Returns whether a value was present.
    pub fn clear_criterion(&mut self, key: &str) -> bool {
        let removed = self.criteria.remove(key).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    /// Bumps `updated_at` to now, never moving it backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms().max(self.updated_at);
    }
}
