//! Forecast store port

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{AssociationId, DomainPort, PortError};

use crate::forecast::CashFlowForecast;

/// Port for forecast records
#[async_trait]
pub trait ForecastStore: DomainPort {
    /// Inserts or replaces the forecast keyed by (association, date)
    ///
    /// Regenerating a projection for a date never duplicates the row.
    async fn upsert_forecast(&self, forecast: &CashFlowForecast) -> Result<(), PortError>;

    /// Lists forecasts dated strictly after `after`, ascending by date
    async fn list_forecasts_after(
        &self,
        association_id: AssociationId,
        after: NaiveDate,
    ) -> Result<Vec<CashFlowForecast>, PortError>;

    /// Lists up to `limit` records dated on or before `as_of`,
    /// most recent first
    async fn list_history(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<CashFlowForecast>, PortError>;
}
