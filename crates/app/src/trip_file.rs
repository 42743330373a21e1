//! JSON trip files.
//!
//! A trip file lists participants, the expenses as they were entered and the
//! planned activities; the ledger is rebuilt by recording every entry again,
//! so a file with an inconsistent split is rejected with the offending
//! expense's title.
//!
//! ```json
//! {
//!   "title": "Lisbon",
//!   "start_date": "2024-05-01",
//!   "end_date": "2024-05-07",
//!   "currency": "EUR",
//!   "location": "Lisbon, Portugal",
//!   "participants": [{ "id": "alice", "name": "Alice" }, { "id": "bob", "name": "Bob" }],
//!   "expenses": [{
//!     "title": "Dinner", "amount_minor": 9000, "date": "2024-05-02", "paid_by": "alice",
//!     "category": "food", "method": "shares",
//!     "shares": { "alice": { "shares": "1" }, "bob": { "shares": "2" } }
//!   }],
//!   "activities": [{ "title": "Tram 28", "date": "2024-05-03", "participants": ["bob"] }]
//! }
//! ```

use std::{fs, path::Path};

use chrono::NaiveDate;
use engine::{Currency, NewActivity, NewExpense, Participant, Trip};
use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct TripFile {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub expenses: Vec<NewExpense>,
    #[serde(default)]
    pub activities: Vec<NewActivity>,
}

impl TripFile {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Rebuilds the ledger; `default_currency` applies when the file has none.
    pub fn into_trip(self, default_currency: Currency) -> Result<Trip> {
        let mut trip = Trip::new(
            self.title,
            self.start_date,
            self.end_date,
            self.currency.unwrap_or(default_currency),
        )?;
        trip.description = self.description;
        trip.location = self.location;
        for participant in self.participants {
            trip.add_participant(participant)?;
        }
        for expense in self.expenses {
            let title = expense.title.clone();
            trip.add_expense(expense).map_err(|source| {
                tracing::warn!("expense '{title}' rejected: {source}");
                AppError::Expense { title, source }
            })?;
        }
        for activity in self.activities {
            let title = activity.title.clone();
            trip.add_activity(activity).map_err(|source| {
                tracing::warn!("activity '{title}' rejected: {source}");
                AppError::Activity { title, source }
            })?;
        }
        tracing::debug!(
            trip = %trip.id,
            expenses = trip.expenses().len(),
            activities = trip.activities().len(),
            "trip loaded"
        );
        Ok(trip)
    }
}
