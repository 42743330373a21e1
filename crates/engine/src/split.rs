//! Split inputs and outputs.
//!
//! A split is described by a [`SplitMethod`] plus one [`ParticipantShare`] per
//! participant. The calculator turns it into an [`Allocation`]: the amount each
//! participant owes for the expense.

use std::{collections::HashMap, fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ParticipantId};

/// Per-participant split inputs keyed by participant id.
pub type Shares = HashMap<ParticipantId, ParticipantShare>;

/// Rule used to divide an expense total among participants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Everybody pays the same amount.
    #[default]
    Equal,
    /// Everybody pays a declared percentage of the total.
    Percentage,
    /// Everybody pays proportionally to a relative weight.
    Shares,
    /// Everybody pays an explicitly entered amount.
    Custom,
}

impl SplitMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Shares => "shares",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SplitMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" | "equally" => Ok(Self::Equal),
            "percentage" | "percent" | "%" => Ok(Self::Percentage),
            "shares" | "share" | "weights" => Ok(Self::Shares),
            "custom" | "amount" | "amounts" => Ok(Self::Custom),
            other => Err(EngineError::InvalidSplit(format!(
                "unknown split method: {other}"
            ))),
        }
    }
}

/// What a single participant entered in the split form.
///
/// Only the field matching the chosen [`SplitMethod`] is read; the others are
/// ignored, so switching method does not require clearing the form. A missing
/// field counts as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantShare {
    /// Percentage of the total, `0..=100`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
    /// Relative weight (not money).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<Decimal>,
    /// Absolute amount owed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_minor: Option<MoneyCents>,
}

impl ParticipantShare {
    #[must_use]
    pub fn percent(percentage: Decimal) -> Self {
        Self {
            percentage: Some(percentage),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn weight(shares: Decimal) -> Self {
        Self {
            shares: Some(shares),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn custom(amount: MoneyCents) -> Self {
        Self {
            amount_minor: Some(amount),
            ..Self::default()
        }
    }
}

/// Amount owed by one participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub participant: ParticipantId,
    pub amount_minor: MoneyCents,
}

/// Computed split of an expense, in participant input order.
///
/// A successfully computed allocation always sums exactly to the expense total
/// and never contains a negative amount.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation {
    lines: Vec<AllocationLine>,
}

impl Allocation {
    pub(crate) fn new(lines: Vec<AllocationLine>) -> Self {
        Self { lines }
    }

    /// Amount owed by `participant`, if they take part in the split.
    #[must_use]
    pub fn get(&self, participant: &ParticipantId) -> Option<MoneyCents> {
        self.lines
            .iter()
            .find(|line| &line.participant == participant)
            .map(|line| line.amount_minor)
    }

    #[must_use]
    pub fn total(&self) -> MoneyCents {
        self.lines.iter().map(|line| line.amount_minor).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AllocationLine> {
        self.lines.iter()
    }

    /// Plain amounts in participant order.
    #[must_use]
    pub fn amounts(&self) -> Vec<MoneyCents> {
        self.lines.iter().map(|line| line.amount_minor).collect()
    }
}

impl<'a> IntoIterator for &'a Allocation {
    type Item = &'a AllocationLine;
    type IntoIter = std::slice::Iter<'a, AllocationLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_aliases() {
        assert_eq!("Equal".parse::<SplitMethod>().unwrap(), SplitMethod::Equal);
        assert_eq!("%".parse::<SplitMethod>().unwrap(), SplitMethod::Percentage);
        assert_eq!(" shares ".parse::<SplitMethod>().unwrap(), SplitMethod::Shares);
        assert_eq!("custom".parse::<SplitMethod>().unwrap(), SplitMethod::Custom);
        assert!(matches!(
            "thirds".parse::<SplitMethod>(),
            Err(EngineError::InvalidSplit(_))
        ));
    }

    #[test]
    fn share_serializes_only_filled_fields() {
        let share = ParticipantShare::weight(Decimal::from(2));
        let json = serde_json::to_value(&share).unwrap();
        assert_eq!(json, serde_json::json!({ "shares": "2" }));

        let parsed: ParticipantShare =
            serde_json::from_value(serde_json::json!({ "amount_minor": 1250 })).unwrap();
        assert_eq!(parsed, ParticipantShare::custom(MoneyCents::new(1250)));
    }

    #[test]
    fn allocation_lookup_and_total() {
        let allocation = Allocation::new(vec![
            AllocationLine {
                participant: "a".into(),
                amount_minor: MoneyCents::new(3334),
            },
            AllocationLine {
                participant: "b".into(),
                amount_minor: MoneyCents::new(6666),
            },
        ]);
        assert_eq!(allocation.get(&"b".into()), Some(MoneyCents::new(6666)));
        assert_eq!(allocation.get(&"c".into()), None);
        assert_eq!(allocation.total(), MoneyCents::new(10_000));
        assert_eq!(allocation.len(), 2);
    }
}
