//! Forecast Domain - Cash Flow Projection
//!
//! Projects future cash balances from historical receipt and disbursement
//! trends, computes the monthly burn rate and runway, and raises
//! threshold alerts. Projections use a deterministic trailing average over
//! recorded history; confidence decays with distance into the future.
//! Forecasts are upserted by (association, date), so regeneration
//! overwrites rather than duplicates.

pub mod forecast;
pub mod projector;
pub mod ports;
pub mod config;
pub mod error;

pub use forecast::CashFlowForecast;
pub use projector::{AlertSeverity, CashFlowAlert, CashFlowForecaster, CashPosition};
pub use ports::ForecastStore;
pub use config::ForecastConfig;
pub use error::ForecastError;
