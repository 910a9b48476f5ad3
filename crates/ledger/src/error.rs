//! The module contains the errors the ledger can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when the input is structurally invalid (splits that
//!   don't add up, empty required fields, self-referential pairs, amounts over
//!   the outstanding exposure).
//! - [`Authorization`] thrown when the actor is not entitled to the operation.
//! - [`NotFound`] thrown when a referenced record does not exist.
//! - [`Consistency`] thrown when the operation would break a standing
//!   invariant (e.g. deleting a group with open balances).
//!
//!  [`Validation`]: LedgerError::Validation
//!  [`Authorization`]: LedgerError::Authorization
//!  [`NotFound`]: LedgerError::NotFound
//!  [`Consistency`]: LedgerError::Consistency
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not authorized: {0}")]
    Authorization(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Inconsistent state: {0}")]
    Consistency(String),
}

impl LedgerError {
    /// The reason to show to the user, without the kind prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::Validation(reason)
            | Self::Authorization(reason)
            | Self::NotFound(reason)
            | Self::Consistency(reason) => reason,
        }
    }
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Authorization(a), Self::Authorization(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Consistency(a), Self::Consistency(b)) => a == b,
            _ => false,
        }
    }
}
