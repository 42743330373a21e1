//! Renders allocations and trip summaries as a table, JSON or CSV.

use std::{collections::BTreeMap, io::Write};

use clap::ValueEnum;
use engine::{Activity, Allocation, Balance, Category, Currency, MoneyCents, Settlement, Trip};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct AllocationRow<'a> {
    participant: &'a str,
    amount_minor: i64,
    amount: String,
}

pub fn allocation(
    out: &mut impl Write,
    format: OutputFormat,
    currency: Currency,
    allocation: &Allocation,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let width = name_width(allocation.iter().map(|line| line.participant.as_str()));
            for line in allocation {
                writeln!(
                    out,
                    "{:<width$}  {:>12}",
                    line.participant,
                    currency.format(line.amount_minor)
                )?;
            }
            writeln!(
                out,
                "{:<width$}  {:>12}",
                "total",
                currency.format(allocation.total())
            )?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, allocation)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            for line in allocation {
                writer.serialize(AllocationRow {
                    participant: line.participant.as_str(),
                    amount_minor: line.amount_minor.cents(),
                    amount: line.amount_minor.to_string(),
                })?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Summary<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    currency: Currency,
    expenses: usize,
    total_minor: MoneyCents,
    per_person: Allocation,
    category_totals: BTreeMap<Category, MoneyCents>,
    balances: Vec<Balance>,
    settlements: Vec<Settlement>,
    activities: Vec<&'a Activity>,
    activities_cost_minor: MoneyCents,
}

#[derive(Serialize)]
struct BalanceRow<'a> {
    participant: &'a str,
    paid_minor: i64,
    owed_minor: i64,
    net_minor: i64,
}

pub fn summary(out: &mut impl Write, format: OutputFormat, trip: &Trip) -> Result<()> {
    let currency = trip.currency;
    let total = trip.total_amount();
    let per_person = if total.is_positive() && !trip.participants().is_empty() {
        trip.per_person_share()?
    } else {
        Allocation::default()
    };
    let balances = trip.balances();

    match format {
        OutputFormat::Table => {
            writeln!(
                out,
                "{} ({} - {}, {})",
                trip.title, trip.start_date, trip.end_date, currency
            )?;
            if let Some(location) = &trip.location {
                writeln!(out, "{location}")?;
            }
            if let Some(description) = &trip.description {
                writeln!(out, "{description}")?;
            }
            writeln!(
                out,
                "{} expenses, total {}",
                trip.expenses().len(),
                currency.format(total)
            )?;

            writeln!(out, "\nby category")?;
            for (category, amount) in trip.category_totals() {
                writeln!(out, "  {:<14}{:>12}", category, currency.format(amount))?;
            }

            let width = name_width(balances.iter().map(|b| b.participant.as_str()));
            writeln!(out, "\nbalances (equal share / paid / owed / net)")?;
            for balance in &balances {
                let share = per_person
                    .get(&balance.participant)
                    .unwrap_or(MoneyCents::ZERO);
                writeln!(
                    out,
                    "  {:<width$}  {:>12}{:>12}{:>12}{:>12}",
                    balance.participant,
                    currency.format(share),
                    currency.format(balance.paid),
                    currency.format(balance.owed),
                    currency.format(balance.net),
                )?;
            }

            let settlements = trip.settlements();
            writeln!(out, "\nsettle up")?;
            if settlements.is_empty() {
                writeln!(out, "  nothing to settle")?;
            }
            for settlement in settlements {
                writeln!(
                    out,
                    "  {} pays {} {}",
                    settlement.from,
                    settlement.to,
                    currency.format(settlement.amount_minor)
                )?;
            }

            let itinerary = trip.itinerary();
            if !itinerary.is_empty() {
                writeln!(
                    out,
                    "\nactivities ({} planned)",
                    currency.format(trip.activities_cost())
                )?;
                for activity in itinerary {
                    activity_line(out, currency, activity)?;
                }
            }
        }
        OutputFormat::Json => {
            let summary = Summary {
                title: &trip.title,
                description: trip.description.as_deref(),
                location: trip.location.as_deref(),
                currency,
                expenses: trip.expenses().len(),
                total_minor: total,
                per_person,
                category_totals: trip.category_totals(),
                balances,
                settlements: trip.settlements(),
                activities: trip.itinerary(),
                activities_cost_minor: trip.activities_cost(),
            };
            serde_json::to_writer_pretty(&mut *out, &summary)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            for balance in &balances {
                writer.serialize(BalanceRow {
                    participant: balance.participant.as_str(),
                    paid_minor: balance.paid.cents(),
                    owed_minor: balance.owed.cents(),
                    net_minor: balance.net.cents(),
                })?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ExportRow<'a> {
    expense_id: String,
    date: String,
    title: &'a str,
    category: Category,
    paid_by: &'a str,
    method: String,
    participant: &'a str,
    amount_minor: i64,
}

/// One CSV row per allocation line of every expense.
pub fn export(out: &mut impl Write, trip: &Trip) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for expense in trip.expenses() {
        for line in &expense.allocation {
            writer.serialize(ExportRow {
                expense_id: expense.id.to_string(),
                date: expense.date.to_string(),
                title: &expense.title,
                category: expense.category,
                paid_by: expense.paid_by.as_str(),
                method: expense.method.to_string(),
                participant: line.participant.as_str(),
                amount_minor: line.amount_minor.cents(),
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn activity_line(out: &mut impl Write, currency: Currency, activity: &Activity) -> Result<()> {
    let when = match activity.time {
        Some(time) => format!("{} {}", activity.date, time.format("%H:%M")),
        None => activity.date.to_string(),
    };
    write!(out, "  {when:<16}  {}", activity.title)?;
    if let Some(location) = &activity.location {
        write!(out, " @ {location}")?;
    }
    write!(out, " ({} going)", activity.participants.len())?;
    if let Some(cost) = activity.cost_minor {
        write!(out, " {}", currency.format(cost))?;
    }
    writeln!(out)?;
    Ok(())
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
        .max("total".len())
}
