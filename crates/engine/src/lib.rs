//! Trip expense splitting engine.
//!
//! The core is the split calculator: [`validate`] and [`compute_allocation`]
//! turn an expense total, a [`SplitMethod`] and per-participant
//! [`ParticipantShare`] inputs into an [`Allocation`] that sums exactly to the
//! total. Both are pure and can be called from any thread.
//!
//! [`Trip`] is a small in-memory ledger built on top of it: it records
//! expenses and derives totals, balances and settlements. It also keeps the
//! trip's [`Activity`] itinerary.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use engine::{MoneyCents, ParticipantId, SplitMethod, compute_allocation};
//!
//! let people: Vec<ParticipantId> = ["a", "b", "c"].into_iter().map(Into::into).collect();
//! let allocation =
//!     compute_allocation(MoneyCents::new(100_00), SplitMethod::Equal, &people, &HashMap::new())
//!         .unwrap();
//! assert_eq!(allocation.get(&"a".into()), Some(MoneyCents::new(33_34)));
//! assert_eq!(allocation.total(), MoneyCents::new(100_00));
//! ```

pub use activity::{Activity, NewActivity};
pub use calculator::{CUSTOM_TOLERANCE_CENTS, compute_allocation, percentage_tolerance, validate};
pub use currency::Currency;
pub use error::EngineError;
pub use expense::{Category, Expense, NewExpense};
pub use money::MoneyCents;
pub use participant::{Participant, ParticipantId};
pub use split::{Allocation, AllocationLine, ParticipantShare, Shares, SplitMethod};
pub use trip::{Balance, Settlement, Trip};

mod activity;
mod calculator;
mod currency;
mod error;
mod expense;
mod money;
mod participant;
mod split;
mod trip;

pub type ResultEngine<T> = Result<T, EngineError>;
