//! The `Trip` holds its participants, the expenses they share and the
//! activities they plan.
//!
//! A trip is an in-memory ledger: every expense is validated and split when it
//! is recorded, and the summaries (totals, balances, settlements) are derived
//! from the recorded allocations on demand. Recording refuses any expense that
//! would push the trip total past `i64::MAX` cents, so the summaries never
//! overflow.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Activity, Allocation, Category, Currency, EngineError, Expense, MoneyCents, NewActivity,
    NewExpense, Participant, ParticipantId, ResultEngine, SplitMethod, compute_allocation,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Trip {
    pub id: Uuid,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    participants: Vec<Participant>,
    expenses: Vec<Expense>,
    activities: Vec<Activity>,
}

/// Where a participant stands once every expense is accounted for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub participant: ParticipantId,
    /// Sum of the expenses this participant paid for.
    pub paid: MoneyCents,
    /// Sum of this participant's allocations.
    pub owed: MoneyCents,
    /// `paid - owed`: positive when the others owe this participant.
    pub net: MoneyCents,
}

/// A transfer that moves a debtor towards a zero balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount_minor: MoneyCents,
}

impl Trip {
    pub fn new(
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        currency: Currency,
    ) -> ResultEngine<Self> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(EngineError::InvalidTrip(
                "trip title must not be empty".to_string(),
            ));
        }
        if end_date < start_date {
            return Err(EngineError::InvalidTrip(format!(
                "trip ends ({end_date}) before it starts ({start_date})"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            start_date,
            end_date,
            currency,
            description: None,
            location: None,
            participants: Vec::new(),
            expenses: Vec::new(),
            activities: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn expense(&self, expense_id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == expense_id)
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn activity(&self, activity_id: Uuid) -> Option<&Activity> {
        self.activities.iter().find(|activity| activity.id == activity_id)
    }

    fn is_participant(&self, id: &ParticipantId) -> bool {
        self.participants.iter().any(|p| &p.id == id)
    }

    /// Adds a participant; ids are unique by normalized key.
    pub fn add_participant(&mut self, participant: Participant) -> ResultEngine<()> {
        let key = participant.id.normalized_key();
        if key.is_empty() {
            return Err(EngineError::InvalidTrip(format!(
                "participant id '{}' must contain a letter or digit",
                participant.id
            )));
        }
        if let Some(existing) = self
            .participants
            .iter()
            .find(|p| p.id.normalized_key() == key)
        {
            return Err(EngineError::InvalidTrip(format!(
                "participant '{}' already present as '{}'",
                participant.id, existing.id
            )));
        }
        tracing::debug!(trip = %self.id, participant = %participant.id, "added participant");
        self.participants.push(participant);
        Ok(())
    }

    /// Validates and splits an expense, then records it.
    pub fn add_expense(&mut self, new: NewExpense) -> ResultEngine<Uuid> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(EngineError::InvalidExpense(
                "expense title must not be empty".to_string(),
            ));
        }
        if !self.is_participant(&new.paid_by) {
            return Err(EngineError::InvalidExpense(format!(
                "payer '{}' is not a trip participant",
                new.paid_by
            )));
        }

        let shared_with = if new.shared_with.is_empty() {
            self.participant_ids()
        } else {
            if let Some(stranger) = new.shared_with.iter().find(|id| !self.is_participant(id)) {
                return Err(EngineError::InvalidExpense(format!(
                    "'{stranger}' is not a trip participant"
                )));
            }
            new.shared_with.clone()
        };

        let allocation = compute_allocation(new.amount_minor, new.method, &shared_with, &new.shares)?;
        if self.total_amount().checked_add(new.amount_minor).is_none() {
            return Err(EngineError::InvalidTrip(format!(
                "recording '{title}' would overflow the trip total"
            )));
        }

        let expense = Expense {
            id: Uuid::new_v4(),
            trip_id: self.id,
            title: title.to_string(),
            amount_minor: new.amount_minor,
            currency: self.currency,
            category: new.category,
            date: new.date,
            paid_by: new.paid_by,
            method: new.method,
            shares: new.shares,
            allocation,
            notes: new.notes,
            created_at: Utc::now(),
        };
        let expense_id = expense.id;
        tracing::debug!(trip = %self.id, expense = %expense_id, total = %expense.amount_minor, "recorded expense");
        self.expenses.push(expense);
        Ok(expense_id)
    }

    pub fn remove_expense(&mut self, expense_id: Uuid) -> ResultEngine<Expense> {
        let index = self
            .expenses
            .iter()
            .position(|expense| expense.id == expense_id)
            .ok_or_else(|| EngineError::InvalidTrip(format!("expense {expense_id} not found")))?;
        Ok(self.expenses.remove(index))
    }

    /// Validates an activity and adds it to the itinerary.
    pub fn add_activity(&mut self, new: NewActivity) -> ResultEngine<Uuid> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(EngineError::InvalidActivity(
                "activity title must not be empty".to_string(),
            ));
        }
        if let Some(cost) = new.cost_minor {
            if cost.is_negative() {
                return Err(EngineError::InvalidActivity(format!(
                    "cost of '{title}' must not be negative, got {cost}"
                )));
            }
            if self.activities_cost().checked_add(cost).is_none() {
                return Err(EngineError::InvalidActivity(format!(
                    "recording '{title}' would overflow the activities cost"
                )));
            }
        }

        let participants = if new.participants.is_empty() {
            self.participant_ids()
        } else {
            let mut seen: Vec<String> = Vec::with_capacity(new.participants.len());
            for id in &new.participants {
                if !self.is_participant(id) {
                    return Err(EngineError::InvalidActivity(format!(
                        "'{id}' is not a trip participant"
                    )));
                }
                let key = id.normalized_key();
                if seen.contains(&key) {
                    return Err(EngineError::InvalidActivity(format!(
                        "'{id}' listed twice for '{title}'"
                    )));
                }
                seen.push(key);
            }
            new.participants.clone()
        };

        let activity = Activity {
            id: Uuid::new_v4(),
            trip_id: self.id,
            title: title.to_string(),
            date: new.date,
            time: new.time,
            duration: new.duration,
            location: new.location,
            description: new.description,
            category: new.category,
            cost_minor: new.cost_minor,
            participants,
            created_at: Utc::now(),
        };
        let activity_id = activity.id;
        tracing::debug!(trip = %self.id, activity = %activity_id, "recorded activity");
        self.activities.push(activity);
        Ok(activity_id)
    }

    pub fn remove_activity(&mut self, activity_id: Uuid) -> ResultEngine<Activity> {
        let index = self
            .activities
            .iter()
            .position(|activity| activity.id == activity_id)
            .ok_or_else(|| EngineError::InvalidTrip(format!("activity {activity_id} not found")))?;
        Ok(self.activities.remove(index))
    }

    /// Itinerary sorted by date, then time; untimed entries first.
    pub fn itinerary(&self) -> Vec<&Activity> {
        let mut activities: Vec<&Activity> = self.activities.iter().collect();
        activities.sort_by_key(|activity| (activity.date, activity.time));
        activities
    }

    /// Sum of the activity costs that were entered.
    pub fn activities_cost(&self) -> MoneyCents {
        self.activities.iter().filter_map(|activity| activity.cost_minor).sum()
    }

    /// Sum of the expense totals. Bounded by `add_expense`, so it cannot
    /// overflow.
    pub fn total_amount(&self) -> MoneyCents {
        self.expenses.iter().map(|expense| expense.amount_minor).sum()
    }

    /// What everybody would pay if the whole trip were split equally.
    pub fn per_person_share(&self) -> ResultEngine<Allocation> {
        compute_allocation(
            self.total_amount(),
            SplitMethod::Equal,
            &self.participant_ids(),
            &HashMap::new(),
        )
    }

    pub fn category_totals(&self) -> BTreeMap<Category, MoneyCents> {
        let mut totals = BTreeMap::new();
        for expense in &self.expenses {
            *totals.entry(expense.category).or_insert(MoneyCents::ZERO) += expense.amount_minor;
        }
        totals
    }

    /// Paid, owed and net amounts per participant, in participant order.
    ///
    /// The nets always add up to zero.
    pub fn balances(&self) -> Vec<Balance> {
        let mut paid: HashMap<&ParticipantId, MoneyCents> = HashMap::new();
        let mut owed: HashMap<&ParticipantId, MoneyCents> = HashMap::new();
        for expense in &self.expenses {
            *paid.entry(&expense.paid_by).or_default() += expense.amount_minor;
            for line in &expense.allocation {
                *owed.entry(&line.participant).or_default() += line.amount_minor;
            }
        }

        self.participants
            .iter()
            .map(|p| {
                let paid = paid.get(&p.id).copied().unwrap_or_default();
                let owed = owed.get(&p.id).copied().unwrap_or_default();
                Balance {
                    participant: p.id.clone(),
                    paid,
                    owed,
                    net: paid - owed,
                }
            })
            .collect()
    }

    /// Transfers that bring every balance to zero.
    ///
    /// Greedy: the largest debtor pays the largest creditor until one of them
    /// is settled. Ties go to the participant added first, so the plan is
    /// stable for a given ledger.
    pub fn settlements(&self) -> Vec<Settlement> {
        let balances = self.balances();
        let mut outstanding: Vec<i64> = balances.iter().map(|b| b.net.cents()).collect();
        let mut settlements = Vec::new();

        loop {
            let debtor = largest(&outstanding, |net| -net);
            let creditor = largest(&outstanding, |net| net);
            let (Some(debtor), Some(creditor)) = (debtor, creditor) else {
                break;
            };
            let amount = (-outstanding[debtor]).min(outstanding[creditor]);
            outstanding[debtor] += amount;
            outstanding[creditor] -= amount;
            settlements.push(Settlement {
                from: balances[debtor].participant.clone(),
                to: balances[creditor].participant.clone(),
                amount_minor: MoneyCents::new(amount),
            });
        }
        settlements
    }
}

/// Index of the largest positive `key(value)`, first one on ties.
fn largest(values: &[i64], key: impl Fn(i64) -> i64) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (index, value) in values.iter().enumerate() {
        let score = key(*value);
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use rust_decimal::Decimal;

    use super::*;
    use crate::ParticipantShare;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn trip_with(names: &[&str]) -> Trip {
        let mut trip = Trip::new("Lisbon", date(1), date(7), Currency::Usd).unwrap();
        for name in names {
            trip.add_participant(Participant::new(*name, name.to_uppercase()))
                .unwrap();
        }
        trip
    }

    #[test]
    fn new_rejects_empty_title_and_reversed_dates() {
        assert!(matches!(
            Trip::new("  ", date(1), date(2), Currency::Usd),
            Err(EngineError::InvalidTrip(_))
        ));
        assert!(matches!(
            Trip::new("Rome", date(5), date(2), Currency::Eur),
            Err(EngineError::InvalidTrip(_))
        ));
    }

    #[test]
    fn add_participant_rejects_normalized_duplicates() {
        let mut trip = trip_with(&["Zoë"]);
        let err = trip.add_participant(Participant::new("zoe", "Zoe")).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTrip("participant 'zoe' already present as 'Zoë'".to_string())
        );
        assert_eq!(trip.participants().len(), 1);
    }

    #[test]
    fn add_expense_defaults_to_all_participants() {
        let mut trip = trip_with(&["alice", "bob", "carol"]);
        let id = trip
            .add_expense(NewExpense::new("Dinner", MoneyCents::new(10_000), date(2), "alice"))
            .unwrap();

        let expense = trip.expense(id).unwrap();
        assert_eq!(
            expense.allocation.amounts(),
            vec![MoneyCents::new(3334), MoneyCents::new(3333), MoneyCents::new(3333)]
        );
        assert_eq!(expense.currency, Currency::Usd);
        assert_eq!(expense.trip_id, trip.id);
    }

    #[test]
    fn add_expense_rejects_strangers_and_leaves_the_ledger_untouched() {
        let mut trip = trip_with(&["alice", "bob"]);
        let err = trip
            .add_expense(NewExpense::new("Taxi", MoneyCents::new(2000), date(2), "mallory"))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidExpense(_)));

        let err = trip
            .add_expense(
                NewExpense::new("Taxi", MoneyCents::new(2000), date(2), "alice")
                    .shared_with(["alice", "mallory"]),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidExpense(_)));

        let err = trip
            .add_expense(
                NewExpense::new("Taxi", MoneyCents::new(2000), date(2), "alice")
                    .method(SplitMethod::Custom)
                    .share("alice", ParticipantShare::custom(MoneyCents::new(500))),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSplit(_)));

        assert!(trip.expenses().is_empty());
    }

    #[test]
    fn balances_net_to_zero_and_settle() {
        let mut trip = trip_with(&["alice", "bob", "carol"]);
        trip.add_expense(
            NewExpense::new("Hotel", MoneyCents::new(9000), date(1), "alice")
                .category(Category::Accommodation),
        )
        .unwrap();
        trip.add_expense(
            NewExpense::new("Museum", MoneyCents::new(3000), date(3), "bob")
                .category(Category::Activities)
                .method(SplitMethod::Shares)
                .shared_with(["bob", "carol"])
                .share("bob", ParticipantShare::weight(Decimal::ONE))
                .share("carol", ParticipantShare::weight(Decimal::from(2))),
        )
        .unwrap();

        let balances = trip.balances();
        let nets: Vec<i64> = balances.iter().map(|b| b.net.cents()).collect();
        // alice: 9000 - 3000, bob: 3000 - 4000, carol: 0 - 5000
        assert_eq!(nets, vec![6000, -1000, -5000]);
        assert_eq!(nets.iter().sum::<i64>(), 0);

        let settlements = trip.settlements();
        assert_eq!(
            settlements,
            vec![
                Settlement {
                    from: "carol".into(),
                    to: "alice".into(),
                    amount_minor: MoneyCents::new(5000),
                },
                Settlement {
                    from: "bob".into(),
                    to: "alice".into(),
                    amount_minor: MoneyCents::new(1000),
                },
            ]
        );

        assert_eq!(trip.total_amount(), MoneyCents::new(12_000));
        let totals = trip.category_totals();
        assert_eq!(totals.get(&Category::Accommodation), Some(&MoneyCents::new(9000)));
        assert_eq!(totals.get(&Category::Activities), Some(&MoneyCents::new(3000)));
        assert_eq!(trip.per_person_share().unwrap().total(), MoneyCents::new(12_000));
    }

    #[test]
    fn add_expense_refuses_to_overflow_the_trip_total() {
        let mut trip = trip_with(&["alice", "bob"]);
        let large = MoneyCents::new(i64::MAX / 2 + 1);
        trip.add_expense(NewExpense::new("Yacht", large, date(2), "alice"))
            .unwrap();

        let err = trip
            .add_expense(NewExpense::new("Second yacht", large, date(3), "bob"))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTrip(_)));
        assert_eq!(trip.expenses().len(), 1);
        assert_eq!(trip.total_amount(), large);
        assert_eq!(trip.category_totals().get(&Category::Other), Some(&large));
        let nets: Vec<i64> = trip.balances().iter().map(|b| b.net.cents()).collect();
        assert_eq!(nets.iter().sum::<i64>(), 0);
    }

    #[test]
    fn description_and_location_are_optional() {
        let trip = trip_with(&[])
            .with_description("Long weekend")
            .with_location("Lisbon, Portugal");
        assert_eq!(trip.description.as_deref(), Some("Long weekend"));
        assert_eq!(trip.location.as_deref(), Some("Lisbon, Portugal"));
        assert!(trip_with(&[]).location.is_none());
    }

    #[test]
    fn add_activity_defaults_to_everybody_and_sorts_the_itinerary() {
        let mut trip = trip_with(&["alice", "bob"]);
        let dinner = trip
            .add_activity(
                NewActivity::new("Fado night", date(3))
                    .time(NaiveTime::from_hms_opt(21, 0, 0).unwrap())
                    .location("Alfama")
                    .cost(MoneyCents::new(4000)),
            )
            .unwrap();
        let tram = trip
            .add_activity(
                NewActivity::new("Tram 28", date(3))
                    .time(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
                    .participants(["bob"]),
            )
            .unwrap();
        let beach = trip
            .add_activity(NewActivity::new("Beach", date(2)).category("Relax"))
            .unwrap();

        let fado = trip.activity(dinner).unwrap();
        assert_eq!(fado.participants, vec![ParticipantId::from("alice"), "bob".into()]);
        assert_eq!(fado.trip_id, trip.id);
        assert_eq!(trip.activity(tram).unwrap().participants, vec![ParticipantId::from("bob")]);

        let order: Vec<Uuid> = trip.itinerary().iter().map(|a| a.id).collect();
        assert_eq!(order, vec![beach, tram, dinner]);
        assert_eq!(trip.activities_cost(), MoneyCents::new(4000));
        // activities never touch the money ledger
        assert_eq!(trip.total_amount(), MoneyCents::ZERO);

        assert_eq!(trip.remove_activity(beach).unwrap().title, "Beach");
        assert_eq!(trip.activities().len(), 2);
        assert!(matches!(
            trip.remove_activity(beach),
            Err(EngineError::InvalidTrip(_))
        ));
    }

    #[test]
    fn add_activity_rejects_strangers_and_bad_input() {
        let mut trip = trip_with(&["alice", "bob"]);

        let err = trip
            .add_activity(NewActivity::new("Surf lesson", date(4)).participants(["alice", "mallory"]))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidActivity("'mallory' is not a trip participant".to_string())
        );

        let err = trip
            .add_activity(NewActivity::new("Surf lesson", date(4)).participants(["bob", "bob"]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidActivity(_)));

        let err = trip
            .add_activity(NewActivity::new("Surf lesson", date(4)).cost(MoneyCents::new(-100)))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidActivity(_)));

        let err = trip.add_activity(NewActivity::new(" ", date(4))).unwrap_err();
        assert!(matches!(err, EngineError::InvalidActivity(_)));

        assert!(trip.activities().is_empty());
    }

    #[test]
    fn remove_expense_updates_summaries() {
        let mut trip = trip_with(&["alice", "bob"]);
        let id = trip
            .add_expense(NewExpense::new("Snacks", MoneyCents::new(500), date(2), "bob"))
            .unwrap();
        assert_eq!(trip.remove_expense(id).unwrap().title, "Snacks");
        assert!(trip.settlements().is_empty());
        assert!(matches!(
            trip.per_person_share(),
            Err(EngineError::InvalidTotal(_))
        ));
        assert!(matches!(
            trip.remove_expense(id),
            Err(EngineError::InvalidTrip(_))
        ));
    }
}
