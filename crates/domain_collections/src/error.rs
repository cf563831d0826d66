//! Collections domain errors

use core_kernel::{MoneyError, PortError};
use thiserror::Error;

use crate::case::CollectionStage;

/// Errors that can occur in the collections domain
#[derive(Debug, Error)]
pub enum CollectionsError {
    /// Escalation target is not strictly later than the current stage
    #[error("Invalid escalation from {from:?} to {to:?}")]
    InvalidEscalation {
        from: CollectionStage,
        to: CollectionStage,
    },

    /// Case is settled or closed and cannot change
    #[error("Case {0} is terminal")]
    CaseTerminal(String),

    /// Money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Store access failed
    #[error(transparent)]
    Store(#[from] PortError),
}
