//! Forecast domain errors

use core_kernel::{MoneyError, PortError, TemporalError};
use thiserror::Error;

/// Errors that can occur in the forecast domain
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Horizon must be at least one month
    #[error("Invalid forecast horizon: {0} months")]
    InvalidHorizon(u32),

    /// Money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Date arithmetic failed
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// Store access failed
    #[error(transparent)]
    Store(#[from] PortError),
}
