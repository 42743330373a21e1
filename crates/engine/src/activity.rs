//! Activities planned during a trip.
//!
//! An activity is an itinerary entry: when and where something happens and
//! who takes part. Its cost is informational; money that changes hands is
//! recorded as an [`Expense`](crate::Expense).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, ParticipantId};

/// Inputs for recording an activity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    /// Free text such as `2h` or `half a day`.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cost_minor: Option<MoneyCents>,
    /// Who takes part. Empty means every trip participant.
    #[serde(default)]
    pub participants: Vec<ParticipantId>,
}

impl NewActivity {
    #[must_use]
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            time: None,
            duration: None,
            location: None,
            description: None,
            category: None,
            cost_minor: None,
            participants: Vec::new(),
        }
    }

    #[must_use]
    pub fn time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn cost(mut self, cost: MoneyCents) -> Self {
        self.cost_minor = Some(cost);
        self
    }

    #[must_use]
    pub fn participants<I, P>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }
}

/// An activity recorded in a trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_minor: Option<MoneyCents>,
    pub participants: Vec<ParticipantId>,
    pub created_at: DateTime<Utc>,
}
