//! Reconciliation domain errors

use core_kernel::{MoneyError, PortError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::statement::ReconciliationStatus;

/// Errors that can occur in the reconciliation domain
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Approval attempted while a difference remains
    #[error("Reconciliation does not balance: difference={difference}")]
    NotBalanced { difference: Decimal },

    /// Illegal lifecycle transition
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: ReconciliationStatus,
        to: ReconciliationStatus,
    },

    /// Mutation attempted on an approved session
    #[error("Reconciliation {0} is approved and immutable")]
    ApprovedImmutable(String),

    /// Money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Store access failed
    #[error(transparent)]
    Store(#[from] PortError),
}
