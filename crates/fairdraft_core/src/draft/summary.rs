//! Per-team criterion summaries for display.
//!
//! Not used for scoring. Members without a value for the key are skipped;
//! they never show up as a phantom category.

use crate::model::player::{in_criterion_range, CriterionValue, Player};
use crate::model::team::{Partition, Team};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeSummary {
    /// Every present value is a number.
    Numeric { count: usize, sum: f64, average: f64 },
    /// At least one present value is a category; numbers are counted by
    /// their printed form.
    Categorical { counts: BTreeMap<String, usize> },
}

/// Summarizes `key` over `members`. Returns `None` when nobody has a value.
pub fn summarize_attribute<'a, I>(members: I, key: &str) -> Option<AttributeSummary>
where
    I: IntoIterator<Item = &'a Player>,
{
    let values: Vec<&CriterionValue> = members
        .into_iter()
        .filter_map(|player| player.criteria.get(key))
        .filter(|value| match value {
            CriterionValue::Number(number) => in_criterion_range(*number),
            CriterionValue::Category(_) => true,
        })
        .collect();

    if values.is_empty() {
        return None;
    }

    let numbers: Option<Vec<f64>> = values.iter().map(|value| value.as_number()).collect();
    if let Some(numbers) = numbers {
        let count = numbers.len();
        let sum: f64 = numbers.iter().sum();
        return Some(AttributeSummary::Numeric {
            count,
            sum,
            average: sum / count as f64,
        });
    }

    let mut counts = BTreeMap::new();
    for value in values {
        let label = match value {
            CriterionValue::Category(label) => label.clone(),
            CriterionValue::Number(number) => number.to_string(),
        };
        *counts.entry(label).or_insert(0) += 1;
    }
    Some(AttributeSummary::Categorical { counts })
}

/// Summarizes `key` over one team of `partition`.
pub fn summarize_team(partition: &Partition, team: &Team, key: &str) -> Option<AttributeSummary> {
    summarize_attribute(partition.members(team), key)
}

/// Summarizes `key` for every team, in team order.
pub fn summarize_teams(partition: &Partition, key: &str) -> Vec<Option<AttributeSummary>> {
    partition
        .teams
        .iter()
        .map(|team| summarize_team(partition, team, key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{summarize_attribute, AttributeSummary};
    use crate::model::player::Player;
    use std::collections::BTreeMap;

    #[test]
    fn numeric_values_report_count_sum_and_average() {
        let players = vec![
            Player::new("Ada").with_number("rating", 80.0),
            Player::new("Bo").with_number("rating", 60.0),
            Player::new("Cy"),
        ];
        assert_eq!(
            summarize_attribute(&players, "rating"),
            Some(AttributeSummary::Numeric {
                count: 2,
                sum: 140.0,
                average: 70.0,
            })
        );
    }

    #[test]
    fn categories_count_each_label_and_skip_missing() {
        let players = vec![
            Player::new("Ada").with_category("position", "Defense"),
            Player::new("Bo").with_category("position", "Forward"),
            Player::new("Cy").with_category("position", "Defense"),
            Player::new("Di"),
        ];
        let expected = BTreeMap::from([("Defense".to_string(), 2), ("Forward".to_string(), 1)]);
        assert_eq!(
            summarize_attribute(&players, "position"),
            Some(AttributeSummary::Categorical { counts: expected })
        );
    }

    #[test]
    fn nobody_with_a_value_yields_none() {
        let players = vec![Player::new("Ada"), Player::new("Bo").with_number("rating", f64::NAN)];
        assert_eq!(summarize_attribute(&players, "rating"), None);
    }
}
