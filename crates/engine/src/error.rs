//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`InvalidTotal`] returned when an expense total is not strictly positive.
//! - [`InvalidSplit`] returned when the split inputs are not self-consistent.
//! - [`EmptyParticipants`] returned when there is nobody to split among.
//!
//! Every error is a rejected computation: nothing is allocated and the caller
//! can retry with corrected input.
//!
//!  [`InvalidTotal`]: EngineError::InvalidTotal
//!  [`InvalidSplit`]: EngineError::InvalidSplit
//!  [`EmptyParticipants`]: EngineError::EmptyParticipants
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid total: {0}")]
    InvalidTotal(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("No participants to split among!")]
    EmptyParticipants,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),
    #[error("Invalid activity: {0}")]
    InvalidActivity(String),
    #[error("Invalid trip: {0}")]
    InvalidTrip(String),
}
