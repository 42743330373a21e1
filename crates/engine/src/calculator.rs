//! Expense split calculator.
//!
//! Pure functions: given a total, a split method, the participants (in a
//! stable order) and their [`ParticipantShare`](crate::ParticipantShare)
//! inputs, compute how much each participant owes.
//!
//! All arithmetic happens on integer cents. Proportional quotas are rounded
//! half-up to the cent, then any cent left over (or overshot) is reconciled so
//! the allocation sums exactly to the total:
//! - missing cents go one each to contributing participants, first to last;
//! - surplus cents are taken one each from contributing participants, last to
//!   first.
//!
//! A participant contributes when its weight (or entered amount) is positive.
//! With equal weights the result matches [`SplitMethod::Equal`].

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{
    Allocation, AllocationLine, EngineError, MoneyCents, ParticipantId, ResultEngine, Shares,
    SplitMethod,
};

/// Allowed distance between the declared percentages and 100 (`0.01`).
#[must_use]
pub fn percentage_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Allowed distance between the custom amounts and the total (one cent).
pub const CUSTOM_TOLERANCE_CENTS: i64 = 1;

/// What the allocation is proportional to, once validated.
enum Basis {
    Equal,
    Weights(Vec<Decimal>),
    Amounts(Vec<i64>),
}

/// Checks that a split can be computed, without computing it.
///
/// Checks run in order: total, participants, then the method-specific
/// consistency rules. Calling it twice with the same inputs gives the same
/// answer.
pub fn validate(
    total: MoneyCents,
    method: SplitMethod,
    participants: &[ParticipantId],
    shares: &Shares,
) -> ResultEngine<()> {
    basis(total, method, participants, shares).map(|_| ())
}

/// Computes how much each participant owes.
///
/// Returns the allocation in `participants` order. On error nothing is
/// allocated.
pub fn compute_allocation(
    total: MoneyCents,
    method: SplitMethod,
    participants: &[ParticipantId],
    shares: &Shares,
) -> ResultEngine<Allocation> {
    let amounts = match basis(total, method, participants, shares)? {
        Basis::Equal => split_equal(total.cents(), participants.len()),
        Basis::Weights(weights) => split_proportional(total.cents(), &weights)?,
        Basis::Amounts(amounts) => reconcile_custom(total.cents(), amounts),
    };

    if amounts.iter().sum::<i64>() != total.cents() || amounts.iter().any(|a| *a < 0) {
        return Err(EngineError::InvalidSplit(
            "allocation cannot be reconciled with the total".to_string(),
        ));
    }

    tracing::debug!(
        %method,
        participants = participants.len(),
        total = %total,
        "computed allocation"
    );

    Ok(Allocation::new(
        participants
            .iter()
            .zip(amounts)
            .map(|(participant, cents)| AllocationLine {
                participant: participant.clone(),
                amount_minor: MoneyCents::new(cents),
            })
            .collect(),
    ))
}

fn basis(
    total: MoneyCents,
    method: SplitMethod,
    participants: &[ParticipantId],
    shares: &Shares,
) -> ResultEngine<Basis> {
    validate_total(total)?;
    validate_participants(participants)?;
    if method != SplitMethod::Equal {
        validate_share_keys(participants, shares)?;
    }

    match method {
        SplitMethod::Equal => Ok(Basis::Equal),
        SplitMethod::Percentage => percentage_weights(participants, shares).map(Basis::Weights),
        SplitMethod::Shares => share_weights(participants, shares).map(Basis::Weights),
        SplitMethod::Custom => custom_amounts(total, participants, shares).map(Basis::Amounts),
    }
}

fn validate_total(total: MoneyCents) -> ResultEngine<()> {
    if !total.is_positive() {
        return Err(EngineError::InvalidTotal(format!(
            "total must be greater than zero, got {total}"
        )));
    }
    Ok(())
}

fn validate_participants(participants: &[ParticipantId]) -> ResultEngine<()> {
    if participants.is_empty() {
        return Err(EngineError::EmptyParticipants);
    }
    let mut seen: HashMap<String, &ParticipantId> = HashMap::with_capacity(participants.len());
    for participant in participants {
        let key = participant.normalized_key();
        if key.is_empty() {
            return Err(EngineError::InvalidSplit(format!(
                "participant id '{participant}' must contain a letter or digit"
            )));
        }
        if let Some(previous) = seen.insert(key, participant) {
            return Err(EngineError::InvalidSplit(format!(
                "duplicate participant: '{previous}' and '{participant}'"
            )));
        }
    }
    Ok(())
}

fn validate_share_keys(
    participants: &[ParticipantId],
    shares: &Shares,
) -> ResultEngine<()> {
    // Report the smallest unknown id so the message does not depend on map order.
    let unknown = shares
        .keys()
        .filter(|id| !participants.contains(id))
        .min();
    if let Some(id) = unknown {
        return Err(EngineError::InvalidSplit(format!(
            "share entered for unknown participant '{id}'"
        )));
    }
    Ok(())
}

fn percentage_weights(
    participants: &[ParticipantId],
    shares: &Shares,
) -> ResultEngine<Vec<Decimal>> {
    let mut weights = Vec::with_capacity(participants.len());
    for participant in participants {
        let percentage = shares
            .get(participant)
            .and_then(|share| share.percentage)
            .unwrap_or(Decimal::ZERO);
        if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(EngineError::InvalidSplit(format!(
                "percentage for '{participant}' must be between 0 and 100, got {percentage}"
            )));
        }
        weights.push(percentage);
    }

    let sum = checked_sum(&weights)?;
    if (sum - Decimal::ONE_HUNDRED).abs() > percentage_tolerance() {
        return Err(EngineError::InvalidSplit(format!(
            "percentages must add up to 100, got {sum}"
        )));
    }
    Ok(weights)
}

fn share_weights(
    participants: &[ParticipantId],
    shares: &Shares,
) -> ResultEngine<Vec<Decimal>> {
    let mut weights = Vec::with_capacity(participants.len());
    for participant in participants {
        let weight = shares
            .get(participant)
            .and_then(|share| share.shares)
            .unwrap_or(Decimal::ZERO);
        if weight < Decimal::ZERO {
            return Err(EngineError::InvalidSplit(format!(
                "shares for '{participant}' must not be negative, got {weight}"
            )));
        }
        weights.push(weight);
    }

    if checked_sum(&weights)?.is_zero() {
        return Err(EngineError::InvalidSplit(
            "shares must add up to more than zero".to_string(),
        ));
    }
    Ok(weights)
}

fn custom_amounts(
    total: MoneyCents,
    participants: &[ParticipantId],
    shares: &Shares,
) -> ResultEngine<Vec<i64>> {
    let mut amounts = Vec::with_capacity(participants.len());
    let mut sum = MoneyCents::ZERO;
    for participant in participants {
        let amount = shares
            .get(participant)
            .and_then(|share| share.amount_minor)
            .unwrap_or(MoneyCents::ZERO);
        if amount.is_negative() {
            return Err(EngineError::InvalidSplit(format!(
                "amount for '{participant}' must not be negative, got {amount}"
            )));
        }
        sum = sum
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidSplit("custom amounts are too large".to_string()))?;
        amounts.push(amount.cents());
    }

    if (sum - total).cents().abs() > CUSTOM_TOLERANCE_CENTS {
        return Err(EngineError::InvalidSplit(format!(
            "custom amounts must add up to {total}, got {sum}"
        )));
    }
    Ok(amounts)
}

fn checked_sum(values: &[Decimal]) -> ResultEngine<Decimal> {
    values.iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(*value)
            .ok_or_else(|| EngineError::InvalidSplit("split values are too large".to_string()))
    })
}

fn split_equal(total: i64, count: usize) -> Vec<i64> {
    let count_i64 = count as i64;
    let mut amounts = vec![total / count_i64; count];
    distribute_remainder(&mut amounts, &vec![true; count], total % count_i64);
    amounts
}

fn split_proportional(total: i64, weights: &[Decimal]) -> ResultEngine<Vec<i64>> {
    let overflow = || EngineError::InvalidSplit("split values are too large".to_string());

    let weight_sum = checked_sum(weights)?;
    let total_dec = Decimal::from(total);
    let mut amounts = Vec::with_capacity(weights.len());
    for weight in weights {
        let quota = total_dec
            .checked_mul(*weight)
            .and_then(|v| v.checked_div(weight_sum))
            .ok_or_else(overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        amounts.push(quota.to_i64().ok_or_else(overflow)?);
    }

    let allocated: i64 = amounts.iter().sum();
    let contributes: Vec<bool> = weights.iter().map(|w| *w > Decimal::ZERO).collect();
    distribute_remainder(&mut amounts, &contributes, total - allocated);
    Ok(amounts)
}

fn reconcile_custom(total: i64, mut amounts: Vec<i64>) -> Vec<i64> {
    let entered: i64 = amounts.iter().sum();
    let contributes: Vec<bool> = amounts.iter().map(|a| *a > 0).collect();
    distribute_remainder(&mut amounts, &contributes, total - entered);
    amounts
}

/// Spreads `remainder` cents over `amounts` one cent at a time.
///
/// Positive remainders are added from the first contributing entry onwards,
/// negative ones are taken from the last contributing entry backwards and never
/// push an entry below zero. When nothing contributes every entry is eligible.
fn distribute_remainder(amounts: &mut [i64], contributes: &[bool], mut remainder: i64) {
    let mut eligible: Vec<usize> = (0..amounts.len()).filter(|&i| contributes[i]).collect();
    if eligible.is_empty() {
        eligible = (0..amounts.len()).collect();
    }
    if eligible.is_empty() {
        return;
    }

    while remainder > 0 {
        for &i in &eligible {
            if remainder == 0 {
                break;
            }
            amounts[i] += 1;
            remainder -= 1;
        }
    }

    while remainder < 0 {
        let mut moved = false;
        for &i in eligible.iter().rev() {
            if remainder == 0 {
                break;
            }
            if amounts[i] > 0 {
                amounts[i] -= 1;
                remainder += 1;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
}
