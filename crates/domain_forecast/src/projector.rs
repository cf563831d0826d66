//! Cash flow projection service
//!
//! Projects future balances from a deterministic trailing average of
//! recorded history, computes the current cash position with burn rate
//! and runway, and raises threshold alerts.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};

use core_kernel::{days_between, AssociationId, Currency, ForecastId, Frequency, Money, UserId};
use domain_ledger::LedgerStore;

use crate::config::ForecastConfig;
use crate::error::ForecastError;
use crate::forecast::CashFlowForecast;
use crate::ports::ForecastStore;

/// Severity of a cash flow alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// A threshold breach worth surfacing to the board
#[derive(Debug, Clone)]
pub struct CashFlowAlert {
    pub severity: AlertSeverity,
    pub message: String,
}

/// Snapshot of an association's cash health as of a date
#[derive(Debug, Clone)]
pub struct CashPosition {
    /// Sum of active cash account balances
    pub current_balance: Money,
    /// Nearest projection at or before 30 days out, if any
    pub projected_30_day: Option<Money>,
    /// Nearest projection at or before 60 days out, if any
    pub projected_60_day: Option<Money>,
    /// Nearest projection at or before 90 days out, if any
    pub projected_90_day: Option<Money>,
    /// Average monthly net outflow over recent history
    ///
    /// Non-positive when the association is cash flow positive.
    pub monthly_burn_rate: Money,
    /// Whole days until cash runs out at the current burn rate
    ///
    /// `None` when the burn rate is non-positive: at current trends the
    /// association never runs out.
    pub days_of_cash_remaining: Option<i64>,
}

/// Service that generates forecasts and reads cash positions
pub struct CashFlowForecaster {
    store: Arc<dyn ForecastStore>,
    ledger: Arc<dyn LedgerStore>,
    config: ForecastConfig,
    currency: Currency,
}

impl CashFlowForecaster {
    pub fn new(
        store: Arc<dyn ForecastStore>,
        ledger: Arc<dyn LedgerStore>,
        config: ForecastConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            currency: config.currency,
            config,
        }
    }

    /// Generates a monthly forecast series starting one month after `as_of`
    ///
    /// The opening balance is the sum of active cash account balances.
    /// Each period projects the trailing average of receipts and
    /// disbursements over recent history, preferring recorded actuals over
    /// old projections. Points are upserted by (association, date), so
    /// regeneration overwrites projections in place.
    pub async fn generate_forecast(
        &self,
        association_id: AssociationId,
        months: u32,
        as_of: NaiveDate,
        actor: UserId,
    ) -> Result<Vec<CashFlowForecast>, ForecastError> {
        if months == 0 {
            return Err(ForecastError::InvalidHorizon(months));
        }

        let current = self.cash_balance(association_id).await?;
        let history = self
            .store
            .list_history(association_id, as_of, self.config.trailing_window)
            .await?;
        let (avg_receipts, avg_disbursements) = trailing_average(&history, self.currency)?;

        debug!(
            history_len = history.len(),
            avg_receipts = %avg_receipts,
            avg_disbursements = %avg_disbursements,
            "computed trailing averages"
        );

        let mut generated = Vec::with_capacity(months as usize);
        let mut opening = current;
        let mut date = as_of;
        for horizon in 1..=months {
            date = Frequency::Monthly.advance(date)?;
            let projected = opening
                .checked_add(&avg_receipts)?
                .checked_sub(&avg_disbursements)?;

            let forecast = CashFlowForecast {
                id: ForecastId::new_v7(),
                association_id,
                forecast_date: date,
                opening_balance: opening,
                projected_receipts: avg_receipts,
                projected_disbursements: avg_disbursements,
                projected_balance: projected,
                actual_receipts: None,
                actual_disbursements: None,
                actual_balance: None,
                confidence_level: CashFlowForecast::confidence_for_horizon(horizon),
                generated_by: actor,
                generated_at: Utc::now(),
            };
            self.store.upsert_forecast(&forecast).await?;
            generated.push(forecast);
            opening = projected;
        }

        info!(
            months,
            opening_balance = %current,
            "generated cash flow forecast"
        );
        Ok(generated)
    }

    /// Computes the association's cash position as of a date
    pub async fn get_cash_position(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<CashPosition, ForecastError> {
        let current = self.cash_balance(association_id).await?;
        let forecasts = self.store.list_forecasts_after(association_id, as_of).await?;

        let burn = self.monthly_burn_rate(association_id, as_of).await?;
        let days_remaining = days_of_cash_remaining(&current, &burn);

        Ok(CashPosition {
            current_balance: current,
            projected_30_day: projection_at(&forecasts, as_of, 30),
            projected_60_day: projection_at(&forecasts, as_of, 60),
            projected_90_day: projection_at(&forecasts, as_of, 90),
            monthly_burn_rate: burn,
            days_of_cash_remaining: days_remaining,
        })
    }

    /// Evaluates threshold alerts against the current position
    ///
    /// Critical: balance already below the configured minimum, or
    /// projected negative within 30 days. Warning: projected below the
    /// minimum within 60 days, or burn rate above the configured fraction
    /// of the current balance.
    pub async fn get_alerts(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<Vec<CashFlowAlert>, ForecastError> {
        let position = self.get_cash_position(association_id, as_of).await?;
        let minimum = Money::new(self.config.minimum_balance, self.currency);
        let mut alerts = Vec::new();

        if position.current_balance.amount() < minimum.amount() {
            alerts.push(CashFlowAlert {
                severity: AlertSeverity::Critical,
                message: format!(
                    "Cash balance {} is below the minimum reserve {}",
                    position.current_balance, minimum
                ),
            });
        }

        if let Some(day30) = position.projected_30_day {
            if day30.is_negative() {
                alerts.push(CashFlowAlert {
                    severity: AlertSeverity::Critical,
                    message: format!("Cash is projected to go negative within 30 days ({})", day30),
                });
            }
        }

        if let Some(day60) = position.projected_60_day {
            if day60.amount() < minimum.amount() {
                alerts.push(CashFlowAlert {
                    severity: AlertSeverity::Warning,
                    message: format!(
                        "Cash is projected below the minimum reserve {} within 60 days ({})",
                        minimum, day60
                    ),
                });
            }
        }

        let burn_threshold = position.current_balance.amount() * self.config.burn_rate_warning_ratio;
        if position.monthly_burn_rate.is_positive()
            && position.monthly_burn_rate.amount() > burn_threshold
        {
            alerts.push(CashFlowAlert {
                severity: AlertSeverity::Warning,
                message: format!(
                    "Monthly burn rate {} exceeds {}% of cash on hand",
                    position.monthly_burn_rate,
                    self.config.burn_rate_warning_ratio * dec!(100)
                ),
            });
        }

        Ok(alerts)
    }

    /// Sums balances of active cash accounts for the association
    async fn cash_balance(&self, association_id: AssociationId) -> Result<Money, ForecastError> {
        let accounts = self.ledger.list_accounts(association_id).await?;
        let mut total = Money::zero(self.currency);
        for account in accounts.iter().filter(|a| a.is_active && a.is_cash_account()) {
            total = total.checked_add(&account.balance)?;
        }
        Ok(total)
    }

    /// Average monthly net outflow over the configured burn window
    async fn monthly_burn_rate(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<Money, ForecastError> {
        let history = self
            .store
            .list_history(association_id, as_of, self.config.burn_rate_months)
            .await?;
        if history.is_empty() {
            return Ok(Money::zero(self.currency));
        }

        let mut net_out = Money::zero(self.currency);
        for record in &history {
            net_out = net_out
                .checked_add(&record.effective_disbursements())?
                .checked_sub(&record.effective_receipts())?;
        }
        Ok(net_out.divide(Decimal::from(history.len() as u64))?)
    }
}

/// Averages effective receipts and disbursements over history records
///
/// An empty history yields zero averages: with nothing to extrapolate
/// from, projections hold the balance flat.
fn trailing_average(
    history: &[CashFlowForecast],
    currency: Currency,
) -> Result<(Money, Money), ForecastError> {
    if history.is_empty() {
        return Ok((Money::zero(currency), Money::zero(currency)));
    }

    let mut receipts = Money::zero(currency);
    let mut disbursements = Money::zero(currency);
    for record in history {
        receipts = receipts.checked_add(&record.effective_receipts())?;
        disbursements = disbursements.checked_add(&record.effective_disbursements())?;
    }
    let count = Decimal::from(history.len() as u64);
    Ok((receipts.divide(count)?, disbursements.divide(count)?))
}

/// Picks the projected balance of the latest forecast within `days` of `as_of`
fn projection_at(forecasts: &[CashFlowForecast], as_of: NaiveDate, days: i64) -> Option<Money> {
    forecasts
        .iter()
        .filter(|f| {
            let distance = days_between(as_of, f.forecast_date);
            distance > 0 && distance <= days
        })
        .max_by_key(|f| f.forecast_date)
        .map(|f| f.projected_balance)
}

/// Whole days of runway at the given burn rate, `None` when burn is
/// non-positive
fn days_of_cash_remaining(current: &Money, monthly_burn: &Money) -> Option<i64> {
    if !monthly_burn.is_positive() || current.is_negative() {
        return if monthly_burn.is_positive() {
            Some(0)
        } else {
            None
        };
    }
    let daily_burn = monthly_burn.amount() / dec!(30);
    (current.amount() / daily_burn).floor().to_i64()
}
