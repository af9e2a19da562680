// Typed failures for the wager ledger and settlement core.
//
// Taxonomy:
//   - validation:     InvalidAmount, InvalidSelection, InvalidStatus
//   - not-found:      EventNotFound, BetNotFound, UserNotFound
//   - state-conflict: InsufficientBalance, AlreadyResolved, AccountExists
//   - transient:      StoreFailure (the only one worth retrying verbatim)

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::WagerStatus;

#[derive(Debug, Clone, Serialize)]
pub enum LedgerError {
    InvalidAmount(String),
    InvalidSelection(String),
    InvalidStatus(String),
    EventNotFound(String),
    BetNotFound(String),
    UserNotFound(String),
    AccountExists(String),
    InsufficientBalance { available: Decimal, requested: Decimal },
    AlreadyResolved { status: WagerStatus },
    StoreFailure(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            LedgerError::InvalidSelection(msg) => write!(f, "Invalid selection: {}", msg),
            LedgerError::InvalidStatus(msg) => write!(f, "Invalid status: {}", msg),
            LedgerError::EventNotFound(id) => write!(f, "Event not found: {}", id),
            LedgerError::BetNotFound(id) => write!(f, "Bet not found: {}", id),
            LedgerError::UserNotFound(email) => write!(f, "User not found: {}", email),
            LedgerError::AccountExists(email) => write!(f, "Account already exists: {}", email),
            LedgerError::InsufficientBalance { available, requested } => {
                write!(f, "Insufficient balance: have {:.2}, need {:.2}", available, requested)
            }
            LedgerError::AlreadyResolved { status } => {
                write!(f, "Bet already resolved: status is {}", status.as_str())
            }
            LedgerError::StoreFailure(msg) => write!(f, "Store failure: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}
