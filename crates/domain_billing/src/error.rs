//! Billing domain errors

use core_kernel::{MoneyError, PortError, TemporalError};
use domain_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Template blueprint lines do not balance
    #[error("Template {0} produces an unbalanced entry")]
    UnbalancedTemplate(String),

    /// Template is not active
    #[error("Template {0} is inactive")]
    InactiveTemplate(String),

    /// Ledger validation failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Date arithmetic failed
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// Money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Store access failed
    #[error(transparent)]
    Store(#[from] PortError),
}
