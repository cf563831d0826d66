//! Forecast records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AssociationId, ForecastId, Money, UserId};

/// Confidence assigned to the first projected period
pub const INITIAL_CONFIDENCE: u8 = 95;
/// Confidence lost per additional period into the future
pub const CONFIDENCE_DECAY_PER_PERIOD: u8 = 5;
/// Confidence never drops below this floor
pub const CONFIDENCE_FLOOR: u8 = 60;

/// One dated cash projection point for an association
///
/// A forecast row is upserted by (association, forecast date): actuals
/// recorded for a past period survive regeneration, while projections are
/// overwritten in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowForecast {
    /// Unique identifier
    pub id: ForecastId,
    /// Owning association
    pub association_id: AssociationId,
    /// The date this point projects
    pub forecast_date: NaiveDate,
    /// Cash balance at the start of the period
    pub opening_balance: Money,
    /// Projected cash in
    pub projected_receipts: Money,
    /// Projected cash out
    pub projected_disbursements: Money,
    /// Projected closing balance
    pub projected_balance: Money,
    /// Actual cash in, once the period has occurred
    pub actual_receipts: Option<Money>,
    /// Actual cash out, once the period has occurred
    pub actual_disbursements: Option<Money>,
    /// Actual closing balance, once the period has occurred
    pub actual_balance: Option<Money>,
    /// Projection confidence, decaying with horizon
    pub confidence_level: u8,
    /// Acting user that generated the projection
    pub generated_by: UserId,
    /// When this point was generated
    pub generated_at: DateTime<Utc>,
}

impl CashFlowForecast {
    /// Confidence for the period at `horizon` (1-based periods ahead)
    pub fn confidence_for_horizon(horizon: u32) -> u8 {
        let decay = CONFIDENCE_DECAY_PER_PERIOD.saturating_mul(
            horizon.saturating_sub(1).min(u8::MAX as u32) as u8,
        );
        INITIAL_CONFIDENCE
            .saturating_sub(decay)
            .max(CONFIDENCE_FLOOR)
    }

    /// Receipts to feed the trailing average: actuals when recorded,
    /// otherwise the projection
    pub fn effective_receipts(&self) -> Money {
        self.actual_receipts.unwrap_or(self.projected_receipts)
    }

    /// Disbursements to feed the trailing average
    pub fn effective_disbursements(&self) -> Money {
        self.actual_disbursements
            .unwrap_or(self.projected_disbursements)
    }
}
