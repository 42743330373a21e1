//! Expenses recorded in a trip.
//!
//! [`NewExpense`] groups what an expense form collects, keeping call sites
//! readable. Recording it in a [`Trip`](crate::Trip) validates the metadata,
//! runs the split calculator and yields an immutable [`Expense`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Allocation, Currency, EngineError, MoneyCents, ParticipantId, ParticipantShare, Shares,
    SplitMethod,
    participant::normalize_key,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Transport,
    Accommodation,
    Activities,
    Shopping,
    #[default]
    Other,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Accommodation => "accommodation",
            Self::Activities => "activities",
            Self::Shopping => "shopping",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "food" | "meals" | "restaurant" => Ok(Self::Food),
            "transport" | "transportation" | "travel" => Ok(Self::Transport),
            "accommodation" | "lodging" | "hotel" => Ok(Self::Accommodation),
            "activities" | "activity" => Ok(Self::Activities),
            "shopping" => Ok(Self::Shopping),
            "other" | "misc" => Ok(Self::Other),
            _ => Err(EngineError::InvalidExpense(format!(
                "unknown category: {}",
                s.trim()
            ))),
        }
    }
}

/// Inputs for recording an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount_minor: MoneyCents,
    #[serde(default)]
    pub category: Category,
    pub date: NaiveDate,
    pub paid_by: ParticipantId,
    #[serde(default)]
    pub method: SplitMethod,
    #[serde(default)]
    pub shares: Shares,
    /// Who splits the expense. Empty means every trip participant.
    #[serde(default)]
    pub shared_with: Vec<ParticipantId>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewExpense {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        amount: MoneyCents,
        date: NaiveDate,
        paid_by: impl Into<ParticipantId>,
    ) -> Self {
        Self {
            title: title.into(),
            amount_minor: amount,
            category: Category::default(),
            date,
            paid_by: paid_by.into(),
            method: SplitMethod::Equal,
            shares: Shares::new(),
            shared_with: Vec::new(),
            notes: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn method(mut self, method: SplitMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn share(mut self, participant: impl Into<ParticipantId>, share: ParticipantShare) -> Self {
        self.shares.insert(participant.into(), share);
        self
    }

    #[must_use]
    pub fn shared_with<I, P>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        self.shared_with = participants.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// An expense that passed validation, with its computed split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub title: String,
    pub amount_minor: MoneyCents,
    pub currency: Currency,
    pub category: Category,
    pub date: NaiveDate,
    pub paid_by: ParticipantId,
    pub method: SplitMethod,
    pub shares: Shares,
    pub allocation: Allocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Participants splitting this expense, in allocation order.
    pub fn shared_with(&self) -> impl Iterator<Item = &ParticipantId> {
        self.allocation.iter().map(|line| &line.participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_loosely() {
        assert_eq!(" Food ".parse::<Category>().unwrap(), Category::Food);
        assert_eq!("Hotel".parse::<Category>().unwrap(), Category::Accommodation);
        assert!(matches!(
            "gifts".parse::<Category>(),
            Err(EngineError::InvalidExpense(_))
        ));
    }

    #[test]
    fn new_expense_deserializes_with_defaults() {
        let json = serde_json::json!({
            "title": "Dinner",
            "amount_minor": 9000,
            "date": "2024-05-01",
            "paid_by": "alice",
        });
        let expense: NewExpense = serde_json::from_value(json).unwrap();
        assert_eq!(expense.method, SplitMethod::Equal);
        assert_eq!(expense.category, Category::Other);
        assert!(expense.shared_with.is_empty());
        assert_eq!(expense.amount_minor, MoneyCents::new(9000));
    }
}
