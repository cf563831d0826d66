//! Ledger domain errors

use core_kernel::{MoneyError, PortError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entry debits and credits do not balance within tolerance
    #[error("Unbalanced entry: debits={debits}, credits={credits}")]
    Unbalanced { debits: Decimal, credits: Decimal },

    /// Entry has no line items
    #[error("Entry {0} has no line items")]
    EmptyEntry(String),

    /// Attempted to mutate an already-posted entry
    #[error("Entry {0} is already posted and immutable")]
    AlreadyPosted(String),

    /// Operation requires a posted entry
    #[error("Entry {0} is not posted")]
    NotPosted(String),

    /// Money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Store access failed
    #[error(transparent)]
    Store(#[from] PortError),
}
